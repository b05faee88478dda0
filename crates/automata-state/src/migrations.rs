//! SurrealDB schema migrations and initialization

use crate::error::StorageError;
use crate::storage_traits::StorageResult;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

/// Initialize all result-store tables in SurrealDB
///
/// Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> StorageResult<()> {
    info!("Initializing eval result schema");
    init_eval_results_table(db).await?;
    info!("Eval result schema initialization complete");
    Ok(())
}

/// Initialize `eval_results` table
///
/// Schema:
/// ```text
/// TABLE eval_results {
///   session_id:  STRING (indexed)
///   run_id:      STRING? (indexed with session_id)
///   eval_result: STRING (codec-encoded payload)
///   seq:         INT (insertion order)
///   created_at:  DATETIME
/// }
/// ```
///
/// Rows are append-only: updates and deletes are not permitted.
async fn init_eval_results_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("Initializing eval_results table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS eval_results SCHEMAFULL
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE FIELD IF NOT EXISTS session_id ON eval_results TYPE string
            ASSERT string::len($value) > 0;
        DEFINE FIELD IF NOT EXISTS run_id ON eval_results TYPE option<string>;
        DEFINE FIELD IF NOT EXISTS eval_result ON eval_results TYPE string;
        DEFINE FIELD IF NOT EXISTS seq ON eval_results TYPE int;
        DEFINE FIELD IF NOT EXISTS created_at ON eval_results TYPE datetime;

        DEFINE INDEX IF NOT EXISTS idx_eval_session ON TABLE eval_results COLUMNS session_id;
        DEFINE INDEX IF NOT EXISTS idx_eval_session_run ON TABLE eval_results COLUMNS session_id, run_id;
        DEFINE INDEX IF NOT EXISTS idx_eval_seq ON TABLE eval_results COLUMNS seq;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StorageError::SchemaSetup(e.to_string()))?
        .check()
        .map_err(|e| StorageError::SchemaSetup(e.to_string()))?;
    info!("✓ eval_results table initialized");
    Ok(())
}
