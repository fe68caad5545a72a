//! End-to-end tests using a Docker PostgreSQL container.
//!
//! Exercises the executor against a live database: insert/select
//! round-trips, placeholder numbering across UPDATE, permission
//! enforcement, constraint mapping, and JSON forwarding.
//!
//! Run with:
//!   cargo test -p restal-adapter-pg --test e2e -- --nocapture
//!
//! Requirements:
//!   - Docker must be running
//!   - Port 5439 must be available (non-standard to avoid conflicts)

use restal_adapter_pg::translate::where_by_request;
use restal_adapter_pg::{AccessGate, PgExecutor, QueryString};
use restal_core::RestalConfig;
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use std::process::Command;
use std::time::Duration;

const CONTAINER_NAME: &str = "restal_test_postgres";
const POSTGRES_PORT: u16 = 5439;
const POSTGRES_PASSWORD: &str = "restal_test_password";
const DATABASE_NAME: &str = "restal_test";

fn database_url() -> String {
    format!(
        "postgres://postgres:{}@localhost:{}/{}",
        POSTGRES_PASSWORD, POSTGRES_PORT, DATABASE_NAME
    )
}

fn start_postgres_container() -> Result<(), String> {
    let output = Command::new("docker")
        .args(["ps", "-a", "-q", "-f", &format!("name={}", CONTAINER_NAME)])
        .output()
        .map_err(|e| format!("Failed to check existing container: {}", e))?;

    if !String::from_utf8_lossy(&output.stdout).trim().is_empty() {
        let _ = Command::new("docker")
            .args(["rm", "-f", CONTAINER_NAME])
            .output();
    }

    let status = Command::new("docker")
        .args([
            "run",
            "-d",
            "--name",
            CONTAINER_NAME,
            "-e",
            &format!("POSTGRES_PASSWORD={}", POSTGRES_PASSWORD),
            "-e",
            &format!("POSTGRES_DB={}", DATABASE_NAME),
            "-p",
            &format!("{}:5432", POSTGRES_PORT),
            "postgres:16-alpine",
        ])
        .status()
        .map_err(|e| format!("Failed to start container: {}", e))?;

    if !status.success() {
        return Err("Failed to start PostgreSQL container".to_string());
    }
    Ok(())
}

fn stop_postgres_container() {
    let _ = Command::new("docker")
        .args(["rm", "-f", CONTAINER_NAME])
        .output();
}

async fn wait_for_postgres() -> Result<PgPool, String> {
    for _ in 1..=30 {
        if let Ok(pool) = PgPool::connect(&database_url()).await {
            if sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok() {
                return Ok(pool);
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Err("PostgreSQL did not become ready".to_string())
}

async fn create_schema(pool: &PgPool) -> Result<(), String> {
    let statements = [
        "CREATE TABLE test (id SERIAL PRIMARY KEY, name TEXT)",
        "CREATE TABLE test3 (id SERIAL PRIMARY KEY, name TEXT UNIQUE)",
        "CREATE TABLE test_readonly_access (id SERIAL PRIMARY KEY, name TEXT)",
        "CREATE TABLE test_json (id SERIAL PRIMARY KEY, data JSONB)",
        "INSERT INTO test_readonly_access (name) VALUES ('test01')",
    ];
    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| format!("schema setup failed: {}", e))?;
    }
    Ok(())
}

fn test_gate() -> AccessGate {
    let yaml = r#"
access:
  restrict: true
  tables:
    test:
      read: true
      write: true
      delete: true
    test3:
      write: true
    test_json:
      read: true
      write: true
    test_readonly_access:
      read: true
"#;
    let config = RestalConfig::from_yaml(yaml).expect("valid test config");
    AccessGate::new(config.access)
}

fn body(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

async fn insert_select_round_trip(executor: &PgExecutor) {
    let data = body(&[("name", json!("prest-test-insert"))]);
    let bytes = executor.insert("public", "test", &data).await.unwrap();
    let inserted: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(inserted["name"], json!("prest-test-insert"));
    assert!(inserted["id"].is_i64() || inserted["id"].is_u64());

    let bytes = executor
        .query_json(
            "SELECT id, name FROM public.test WHERE name=$1",
            &[json!("prest-test-insert")],
        )
        .await
        .unwrap();
    let rows: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(rows[0]["name"], inserted["name"]);
    assert_eq!(rows[0]["id"], inserted["id"]);
}

async fn update_continues_placeholder_numbering(executor: &PgExecutor) {
    let query = QueryString::parse("name=prest-test-insert");
    let filter = where_by_request(&query, 1).unwrap();
    let data = body(&[("name", json!("prest-test-updated"))]);

    let bytes = executor
        .update("public", "test", &filter, &data)
        .await
        .unwrap();
    let rows: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(rows[0]["name"], json!("prest-test-updated"));
}

async fn delete_returns_removed_rows(executor: &PgExecutor) {
    let query = QueryString::parse("name=prest-test-updated");
    let filter = where_by_request(&query, 1).unwrap();

    let bytes = executor.delete("public", "test", &filter).await.unwrap();
    let rows: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(rows.as_array().map(|r| r.len()), Some(1));

    let bytes = executor
        .query_json(
            "SELECT id FROM public.test WHERE name=$1",
            &[json!("prest-test-updated")],
        )
        .await
        .unwrap();
    let rows: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(rows.as_array().map(|r| r.len()), Some(0));
}

async fn write_denied_never_reaches_database(executor: &PgExecutor, pool: &PgPool) {
    let data = body(&[("name", json!("prest-no-write"))]);
    let err = executor
        .insert("public", "test_readonly_access", &data)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        restal_adapter_pg::AdapterError::PermissionDenied { .. }
    ));

    let filter = where_by_request(&QueryString::parse("name=test01"), 1).unwrap();
    let err = executor
        .delete("public", "test_readonly_access", &filter)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        restal_adapter_pg::AdapterError::PermissionDenied { .. }
    ));

    // The seeded row is untouched.
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM test_readonly_access WHERE name = 'test01'")
            .fetch_one(pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

async fn constraint_violation_is_mapped(executor: &PgExecutor) {
    let data = body(&[("name", json!("prest"))]);
    executor.insert("public", "test3", &data).await.unwrap();

    let err = executor.insert("public", "test3", &data).await.unwrap_err();
    assert!(matches!(
        err,
        restal_adapter_pg::AdapterError::ConstraintViolation(_)
    ));
}

async fn jsonb_is_forwarded_structurally(executor: &PgExecutor) {
    let data = body(&[("data", json!({"description": "bla", "n": 1}))]);
    executor.insert("public", "test_json", &data).await.unwrap();

    let bytes = executor
        .query_json(
            "SELECT data FROM public.test_json WHERE data->>'description'=$1",
            &[json!("bla")],
        )
        .await
        .unwrap();
    let rows: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(rows[0]["data"]["description"], json!("bla"));
    assert_eq!(rows[0]["data"]["n"], json!(1));
}

/// Run all executor tests sequentially against one shared container.
#[tokio::test]
async fn e2e_all_tests() {
    if start_postgres_container().is_err() {
        eprintln!("Skipping e2e: Docker is not available");
        return;
    }

    let pool = match wait_for_postgres().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping e2e: {}", e);
            stop_postgres_container();
            return;
        }
    };

    if let Err(e) = create_schema(&pool).await {
        eprintln!("Skipping e2e: {}", e);
        stop_postgres_container();
        return;
    }

    let executor = PgExecutor::new(pool.clone(), test_gate());

    insert_select_round_trip(&executor).await;
    update_continues_placeholder_numbering(&executor).await;
    delete_returns_removed_rows(&executor).await;
    write_denied_never_reaches_database(&executor, &pool).await;
    constraint_violation_is_mapped(&executor).await;
    jsonb_is_forwarded_structurally(&executor).await;

    stop_postgres_container();
}
