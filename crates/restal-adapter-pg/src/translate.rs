//! Request-to-SQL fragment translation.
//!
//! Every function here is pure over the request: no connection, no shared
//! state. Client values never reach the emitted text; they land in the
//! positional parameter vector and the clause carries `$n` placeholders.

use serde_json::Value;

use crate::error::AdapterError;
use crate::ident::valid_identifier;
use crate::operators::resolve_operator;
use crate::request::{is_reserved_param, QueryString};

/// A WHERE filter (without the leading `WHERE` keyword) together with its
/// positional parameter vector.
#[derive(Debug, Clone, Default)]
pub struct WhereClause {
    /// Clause text, empty when no non-reserved parameter was present.
    pub clause: String,
    /// Values in placeholder order.
    pub params: Vec<Value>,
    /// The next free placeholder index.
    pub next_placeholder: usize,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }
}

/// Synthesize a WHERE clause from the request's non-reserved query
/// parameters, numbering placeholders from `start`.
///
/// Each entry becomes one `field=$n` clause (implicit equality), joined by
/// ` AND ` in multi-map order. A key of the form `field:cast` renders as
/// `field::cast=$n`; the special cast `jsonb` instead rewrites the JSON
/// arrow path, quoting the rightmost segment.
pub fn where_by_request(query: &QueryString, start: usize) -> Result<WhereClause, AdapterError> {
    let mut clauses = Vec::new();
    let mut params = Vec::new();
    let mut placeholder = start;

    for (key, value) in query.iter() {
        if is_reserved_param(key) {
            continue;
        }
        let field = render_field(key)?;
        clauses.push(format!("{field}=${placeholder}"));
        params.push(Value::String(value.to_string()));
        placeholder += 1;
    }

    Ok(WhereClause {
        clause: clauses.join(" AND "),
        params,
        next_placeholder: placeholder,
    })
}

/// Render the field portion of a WHERE key, validating identifiers and
/// applying any `:cast` suffix.
fn render_field(key: &str) -> Result<String, AdapterError> {
    let Some((name, cast)) = key.rsplit_once(':') else {
        if !valid_identifier(key) {
            return Err(AdapterError::InvalidIdentifier(key.to_string()));
        }
        return Ok(key.to_string());
    };

    if cast == "jsonb" {
        return quote_json_path(name);
    }
    if !valid_identifier(name) {
        return Err(AdapterError::InvalidIdentifier(name.to_string()));
    }
    if !valid_identifier(cast) {
        return Err(AdapterError::InvalidIdentifier(cast.to_string()));
    }
    Ok(format!("{name}::{cast}"))
}

/// Quote the rightmost arrow segment of a JSON path:
/// `data->>description` becomes `data->>'description'`.
fn quote_json_path(field: &str) -> Result<String, AdapterError> {
    let (pos, arrow) = if let Some(pos) = field.rfind("->>") {
        (pos, "->>")
    } else if let Some(pos) = field.rfind("->") {
        (pos, "->")
    } else {
        return Err(AdapterError::InvalidIdentifier(field.to_string()));
    };

    let base = &field[..pos];
    let leaf = &field[pos + arrow.len()..];
    let root = base.split("->").next().unwrap_or(base);
    if !valid_identifier(root) {
        return Err(AdapterError::InvalidIdentifier(root.to_string()));
    }
    if !valid_identifier(leaf) {
        return Err(AdapterError::InvalidIdentifier(leaf.to_string()));
    }
    Ok(format!("{base}{arrow}'{leaf}'"))
}

/// Synthesize JOIN clauses from the `_join` parameters.
///
/// Each value is a colon-delimited 5-tuple `kind:table:lhs:op:rhs`, e.g.
/// `inner:test2:test2.name:$eq:test.name`.
pub fn join_by_request(query: &QueryString) -> Result<Vec<String>, AdapterError> {
    let mut joins = Vec::new();

    for value in query.all("_join") {
        let parts: Vec<&str> = value.split(':').collect();
        if parts.len() < 5 {
            return Err(AdapterError::MalformedJoin);
        }

        let kind = match parts[0].to_ascii_lowercase().as_str() {
            "inner" | "left" | "right" | "outer" => parts[0].to_ascii_uppercase(),
            _ => return Err(AdapterError::MalformedJoin),
        };
        let (table, lhs, rhs) = (parts[1], parts[2], parts[4]);
        let op = resolve_operator(parts[3])?;

        for token in [table, lhs, rhs] {
            if !valid_identifier(token) {
                return Err(AdapterError::InvalidIdentifier(token.to_string()));
            }
        }

        joins.push(format!("{kind} JOIN {table} ON {lhs} {op} {rhs}"));
    }

    Ok(joins)
}

/// Synthesize an ORDER BY clause from `_order`, a comma-separated column
/// list where a leading `-` marks descending.
pub fn order_by_request(query: &QueryString) -> Result<String, AdapterError> {
    let raw = match query.get("_order") {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(String::new()),
    };

    let mut columns = Vec::new();
    for field in raw.split(',') {
        let (column, descending) = match field.strip_prefix('-') {
            Some(column) => (column, true),
            None => (field, false),
        };
        if !valid_identifier(column) {
            return Err(AdapterError::InvalidIdentifier(column.to_string()));
        }
        if descending {
            columns.push(format!("{column} DESC"));
        } else {
            columns.push(column.to_string());
        }
    }

    Ok(format!("ORDER BY {}", columns.join(", ")))
}

/// Synthesize the LIMIT/OFFSET fragment from `_page` (1-based) and
/// `_page_size`. Both must be present for a fragment to be emitted.
pub fn paginate_if_possible(query: &QueryString) -> Result<String, AdapterError> {
    let (page, size) = match (query.get("_page"), query.get("_page_size")) {
        (Some(page), Some(size)) => (page, size),
        _ => return Ok(String::new()),
    };

    let page: i64 = page.parse().map_err(|_| AdapterError::BadPagination)?;
    let size: i64 = size.parse().map_err(|_| AdapterError::BadPagination)?;

    Ok(format!("LIMIT {size} OFFSET({page} - 1) * {size}"))
}

/// Synthesize the COUNT prefix from `_count`: `*` counts rows, anything
/// else is a column name.
pub fn count_by_request(query: &QueryString) -> Result<String, AdapterError> {
    let field = match query.get("_count") {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(String::new()),
    };

    if field == "*" {
        return Ok("SELECT COUNT(*) FROM".to_string());
    }
    if !valid_identifier(field) {
        return Err(AdapterError::InvalidIdentifier(field.to_string()));
    }
    Ok(format!("SELECT COUNT({field}) FROM"))
}

/// The requested projection from `_select`; `*` when absent or empty.
pub fn columns_by_request(query: &QueryString) -> Vec<String> {
    match query.get("_select") {
        Some(value) if !value.is_empty() => value.split(',').map(str::to_string).collect(),
        _ => vec!["*".to_string()],
    }
}

/// Assemble the SELECT prefix from a projection list.
pub fn select_fields(fields: &[String]) -> Result<String, AdapterError> {
    if fields.is_empty() {
        return Err(AdapterError::EmptyProjection);
    }
    for field in fields {
        if field != "*" && !valid_identifier(field) {
            return Err(AdapterError::InvalidIdentifier(field.to_string()));
        }
    }
    Ok(format!("SELECT {} FROM", fields.join(",")))
}
