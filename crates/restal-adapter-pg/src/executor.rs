//! Statement assembly, execution, and row-to-JSON serialization.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{json, Map, Value};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{Column, PgPool, Row, TypeInfo};

use restal_core::{Operation, UpstreamConfig};

use crate::error::AdapterError;
use crate::gate::AccessGate;
use crate::ident::valid_identifier;
use crate::translate::WhereClause;

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, PgArguments>;

/// Executes translated statements against the connection pool and
/// serializes result rows as JSON.
///
/// One connection is acquired per statement and released when the call
/// returns; dropping an in-flight call (client disconnect) cancels the
/// statement on a best-effort basis through the driver.
#[derive(Clone)]
pub struct PgExecutor {
    pool: PgPool,
    gate: AccessGate,
}

impl PgExecutor {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool, gate: AccessGate) -> Self {
        Self { pool, gate }
    }

    /// Connect a pool from the upstream configuration.
    pub async fn connect(upstream: &UpstreamConfig, gate: AccessGate) -> Result<Self, AdapterError> {
        let pool = PgPoolOptions::new()
            .max_connections(upstream.max_connections)
            .connect(&upstream.connection_string())
            .await?;
        Ok(Self { pool, gate })
    }

    /// The access gate this executor enforces.
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Run a fully formed statement with positional parameters and
    /// serialize all rows into a JSON array.
    ///
    /// The output is buffered; nothing is emitted on error.
    pub async fn query_json(&self, sql: &str, params: &[Value]) -> Result<Vec<u8>, AdapterError> {
        let rows = self.fetch_rows(sql, params).await?;
        let body: Vec<Value> = rows.iter().map(row_to_json).collect();
        Ok(serde_json::to_vec(&Value::Array(body)).unwrap_or_default())
    }

    /// INSERT a row built from a column-to-value mapping, returning the
    /// inserted row as a JSON object.
    pub async fn insert(
        &self,
        schema: &str,
        table: &str,
        data: &Map<String, Value>,
    ) -> Result<Vec<u8>, AdapterError> {
        if !self.gate.table_allowed(table, Operation::Write) {
            return Err(AdapterError::denied(table, Operation::Write));
        }
        let (sql, params) = build_insert(schema, table, data)?;
        let rows = self.fetch_rows(&sql, &params).await?;
        let returned = rows.first().map(row_to_json).unwrap_or(Value::Null);
        Ok(serde_json::to_vec(&returned).unwrap_or_default())
    }

    /// UPDATE rows matching a translated WHERE clause, returning the
    /// updated rows as a JSON array.
    ///
    /// SET placeholders continue past the WHERE vector's indices; the
    /// bound vector is the WHERE parameters followed by the SET values.
    pub async fn update(
        &self,
        schema: &str,
        table: &str,
        filter: &WhereClause,
        data: &Map<String, Value>,
    ) -> Result<Vec<u8>, AdapterError> {
        if !self.gate.table_allowed(table, Operation::Write) {
            return Err(AdapterError::denied(table, Operation::Write));
        }
        let (sql, set_params) = build_update(schema, table, filter, data)?;
        let mut params = filter.params.clone();
        params.extend(set_params);
        let rows = self.fetch_rows(&sql, &params).await?;
        let body: Vec<Value> = rows.iter().map(row_to_json).collect();
        Ok(serde_json::to_vec(&Value::Array(body)).unwrap_or_default())
    }

    /// DELETE rows matching a translated WHERE clause, returning the
    /// deleted rows as a JSON array.
    pub async fn delete(
        &self,
        schema: &str,
        table: &str,
        filter: &WhereClause,
    ) -> Result<Vec<u8>, AdapterError> {
        if !self.gate.table_allowed(table, Operation::Delete) {
            return Err(AdapterError::denied(table, Operation::Delete));
        }
        let sql = build_delete(schema, table, filter)?;
        let rows = self.fetch_rows(&sql, &filter.params).await?;
        let body: Vec<Value> = rows.iter().map(row_to_json).collect();
        Ok(serde_json::to_vec(&Value::Array(body)).unwrap_or_default())
    }

    async fn fetch_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<PgRow>, AdapterError> {
        if !statement_is_clean(sql) {
            return Err(AdapterError::MalformedStatement);
        }
        tracing::debug!(statement = sql, "executing");

        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_value(query, param);
        }
        query.fetch_all(&self.pool).await.map_err(map_db_error)
    }
}

/// Surface check on final SQL text: only characters that can appear in
/// statements assembled from vetted identifiers and the fixed templates.
fn statement_is_clean(sql: &str) -> bool {
    sql.chars()
        .all(|c| c.is_ascii_alphanumeric() || "_$,.()*=<>!: '\"-".contains(c))
}

fn build_insert(
    schema: &str,
    table: &str,
    data: &Map<String, Value>,
) -> Result<(String, Vec<Value>), AdapterError> {
    for token in [schema, table] {
        if !valid_identifier(token) {
            return Err(AdapterError::InvalidIdentifier(token.to_string()));
        }
    }

    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    let mut params = Vec::new();
    for (index, (column, value)) in data.iter().enumerate() {
        if !valid_identifier(column) {
            return Err(AdapterError::InvalidIdentifier(column.clone()));
        }
        columns.push(column.as_str());
        placeholders.push(format!("${}", index + 1));
        params.push(value.clone());
    }

    let sql = format!(
        "INSERT INTO {schema}.{table} ({}) VALUES ({}) RETURNING *",
        columns.join(","),
        placeholders.join(",")
    );
    Ok((sql, params))
}

fn build_update(
    schema: &str,
    table: &str,
    filter: &WhereClause,
    data: &Map<String, Value>,
) -> Result<(String, Vec<Value>), AdapterError> {
    for token in [schema, table] {
        if !valid_identifier(token) {
            return Err(AdapterError::InvalidIdentifier(token.to_string()));
        }
    }

    let mut assignments = Vec::new();
    let mut params = Vec::new();
    let mut placeholder = filter.next_placeholder.max(1);
    for (column, value) in data {
        if !valid_identifier(column) {
            return Err(AdapterError::InvalidIdentifier(column.clone()));
        }
        assignments.push(format!("{column}=${placeholder}"));
        params.push(value.clone());
        placeholder += 1;
    }

    let mut sql = format!("UPDATE {schema}.{table} SET {}", assignments.join(", "));
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.clause);
    }
    sql.push_str(" RETURNING *");
    Ok((sql, params))
}

fn build_delete(schema: &str, table: &str, filter: &WhereClause) -> Result<String, AdapterError> {
    for token in [schema, table] {
        if !valid_identifier(token) {
            return Err(AdapterError::InvalidIdentifier(token.to_string()));
        }
    }

    let mut sql = format!("DELETE FROM {schema}.{table}");
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.clause);
    }
    sql.push_str(" RETURNING *");
    Ok(sql)
}

/// Bind a JSON value positionally. Arrays and objects are bound as JSONB.
fn bind_value<'q>(query: PgQuery<'q>, value: &'q Value) -> PgQuery<'q> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(flag) => query.bind(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(int) => query.bind(int),
            None => query.bind(number.as_f64().unwrap_or(0.0)),
        },
        Value::String(text) => query.bind(text.as_str()),
        other => query.bind(sqlx::types::Json(other.clone())),
    }
}

fn map_db_error(err: sqlx::Error) -> AdapterError {
    if let sqlx::Error::Database(db_err) = &err {
        // SQLSTATE class 23: integrity constraint violations.
        if db_err.code().is_some_and(|code| code.starts_with("23")) {
            return AdapterError::ConstraintViolation(db_err.message().to_string());
        }
    }
    AdapterError::Execution(err)
}

/// Serialize one row to a JSON object, keyed and ordered by the result
/// descriptor's columns.
fn row_to_json(row: &PgRow) -> Value {
    let mut object = Map::new();
    for column in row.columns() {
        let value = column_to_json(row, column.ordinal(), column.type_info().name());
        object.insert(column.name().to_string(), value);
    }
    Value::Object(object)
}

/// Decode one column by its declared type. NULL maps to JSON null,
/// JSON/JSONB are forwarded structurally, BYTEA is base64-encoded.
fn column_to_json(row: &PgRow, idx: usize, type_name: &str) -> Value {
    match type_name {
        "INT2" => scan::<i16>(row, idx).map_or(Value::Null, |v| json!(v)),
        "INT4" => scan::<i32>(row, idx).map_or(Value::Null, |v| json!(v)),
        "INT8" => scan::<i64>(row, idx).map_or(Value::Null, |v| json!(v)),
        "FLOAT4" => scan::<f32>(row, idx).map_or(Value::Null, |v| json!(v)),
        "FLOAT8" => scan::<f64>(row, idx).map_or(Value::Null, |v| json!(v)),
        "NUMERIC" => scan::<BigDecimal>(row, idx)
            .and_then(|v| v.to_f64())
            .map_or(Value::Null, |v| json!(v)),
        "BOOL" => scan::<bool>(row, idx).map_or(Value::Null, |v| json!(v)),
        "JSON" | "JSONB" => scan::<Value>(row, idx).unwrap_or(Value::Null),
        "BYTEA" => scan::<Vec<u8>>(row, idx).map_or(Value::Null, |v| json!(BASE64.encode(v))),
        "TIMESTAMPTZ" => {
            scan::<DateTime<Utc>>(row, idx).map_or(Value::Null, |v| json!(v.to_rfc3339()))
        }
        "TIMESTAMP" => scan::<NaiveDateTime>(row, idx)
            .map_or(Value::Null, |v| {
                json!(v.format("%Y-%m-%dT%H:%M:%S").to_string())
            }),
        "DATE" => scan::<NaiveDate>(row, idx)
            .map_or(Value::Null, |v| json!(v.format("%Y-%m-%d").to_string())),
        "TIME" => scan::<NaiveTime>(row, idx)
            .map_or(Value::Null, |v| json!(v.format("%H:%M:%S").to_string())),
        "UUID" => scan::<uuid::Uuid>(row, idx).map_or(Value::Null, |v| json!(v.to_string())),
        // TEXT, VARCHAR, NAME, BPCHAR, and anything else textual.
        _ => scan::<String>(row, idx).map_or(Value::Null, |v| json!(v)),
    }
}

fn scan<'r, T>(row: &'r PgRow, idx: usize) -> Option<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<Option<T>, _>(idx).ok().flatten()
}
