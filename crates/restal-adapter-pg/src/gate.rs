//! Access gate: per-table operation checks and column projection
//! filtering.

use restal_core::{AccessConfig, Operation};

/// Policy object enforcing the configured table rules.
///
/// Built once from [`AccessConfig`] at startup; immutable afterwards and
/// safe to share across request workers.
#[derive(Debug, Clone)]
pub struct AccessGate {
    config: AccessConfig,
}

impl AccessGate {
    /// Create a gate over the given access rules.
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    /// Whether `op` is permitted on `table`.
    ///
    /// Always true when `restrict` is off. Otherwise the table must have a
    /// rule granting the operation; tables without a rule are denied.
    pub fn table_allowed(&self, table: &str, op: Operation) -> bool {
        if !self.config.restrict {
            return true;
        }
        self.config.rule(table).is_some_and(|rule| rule.grants(op))
    }

    /// Filter a requested column list against the table's `fields`
    /// whitelist.
    ///
    /// With `restrict` off the request passes through unchanged (so `*`
    /// stays `*`). With it on, `*` expands to the whitelist and explicit
    /// columns are intersected with it; a rule without `fields` admits all
    /// requested columns, and a table without a rule admits none.
    ///
    /// There is no error signal here; callers treat an empty result as "no
    /// permitted columns" and reject the request upstream.
    pub fn filter_columns(&self, table: &str, requested: &[String]) -> Vec<String> {
        if !self.config.restrict {
            return requested.to_vec();
        }
        let Some(rule) = self.config.rule(table) else {
            return Vec::new();
        };
        let Some(allowed) = &rule.fields else {
            return requested.to_vec();
        };

        let mut columns = Vec::new();
        for column in requested {
            if column == "*" {
                columns.extend(allowed.iter().cloned());
            } else if allowed.contains(column) {
                columns.push(column.clone());
            }
        }
        columns
    }
}
