//! Table access rule configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Operations a table rule can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => f.write_str("read"),
            Operation::Write => f.write_str("write"),
            Operation::Delete => f.write_str("delete"),
        }
    }
}

/// Access rules for the whole API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// When false, every rule is treated as permissive.
    #[serde(default)]
    pub restrict: bool,

    /// Per-table rules, keyed by table name.
    #[serde(default)]
    pub tables: HashMap<String, TableRule>,
}

/// Permissions for a single table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRule {
    /// Whether SELECT is permitted.
    #[serde(default)]
    pub read: bool,

    /// Whether INSERT and UPDATE are permitted.
    #[serde(default)]
    pub write: bool,

    /// Whether DELETE is permitted.
    #[serde(default)]
    pub delete: bool,

    /// Column whitelist for reads. Absent means all columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl TableRule {
    /// Whether this rule grants the given operation.
    pub fn grants(&self, op: Operation) -> bool {
        match op {
            Operation::Read => self.read,
            Operation::Write => self.write,
            Operation::Delete => self.delete,
        }
    }
}

impl AccessConfig {
    /// Look up the rule for a table, if configured.
    pub fn rule(&self, table: &str) -> Option<&TableRule> {
        self.tables.get(table)
    }
}
