//! SurrealDB-backed ResultStore implementation
//!
//! Uses `schema::EvalResultRow` for persistence, converting to/from
//! `storage_traits::EvalRecord` at the boundary.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::migrations;
use crate::schema::{EvalResultRow, SeqRow};
use crate::storage_traits::{EvalRecord, RecordFilter, ResultStore, StorageResult};

/// SurrealDB-backed implementation of [`ResultStore`].
///
/// The handle owns its connection. Share it behind an `Arc` and release it
/// with [`SurrealResultStore::close`] (or by dropping the last reference).
pub struct SurrealResultStore {
    db: Surreal<Any>,
    next_seq: AtomicU64,
}

impl SurrealResultStore {
    /// Create an in-memory instance for testing.
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect(&StoreConfig::in_memory()).await
    }

    /// Create from environment variables (see [`StoreConfig::from_env`]).
    pub async fn from_env() -> StorageResult<Self> {
        Self::connect(&StoreConfig::from_env()).await
    }

    /// Connect to the configured engine, sign in if credentials are set,
    /// select namespace/database and run schema migrations.
    #[instrument(skip(config), fields(url = %config.url, namespace = %config.namespace, database = %config.database))]
    pub async fn connect(config: &StoreConfig) -> StorageResult<Self> {
        if let Some(path) = config.local_path() {
            std::fs::create_dir_all(path).map_err(|e| {
                StorageError::Connection(format!(
                    "Failed to create database directory {}: {}",
                    path, e
                ))
            })?;
        }

        let db = surrealdb::engine::any::connect(&config.url)
            .await
            .map_err(|e| {
                StorageError::Connection(format!("Failed to connect to {}: {}", config.url, e))
            })?;

        if let Some(creds) = &config.credentials {
            if creds.is_root {
                db.signin(Root {
                    username: &creds.username,
                    password: &creds.password,
                })
                .await
                .map_err(|e| StorageError::Connection(format!("Root auth failed: {e}")))?;
            } else {
                db.signin(Database {
                    namespace: &config.namespace,
                    database: &config.database,
                    username: &creds.username,
                    password: &creds.password,
                })
                .await
                .map_err(|e| StorageError::Connection(format!("DB auth failed: {e}")))?;
            }
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StorageError::Connection(format!("Failed to select namespace/database: {}", e))
            })?;

        migrations::init_schema(&db).await?;

        let next_seq = Self::last_seq(&db).await?.map_or(0, |seq| seq + 1);
        info!(next_seq, "SurrealResultStore connected");

        Ok(Self {
            db,
            next_seq: AtomicU64::new(next_seq),
        })
    }

    /// Release the connection.
    pub fn close(self) {
        info!("SurrealResultStore closed");
        drop(self.db);
    }

    async fn last_seq(db: &Surreal<Any>) -> StorageResult<Option<u64>> {
        let mut res = db
            .query("SELECT seq FROM eval_results ORDER BY seq DESC LIMIT 1")
            .await?;
        let rows: Vec<SeqRow> = res.take(0)?;
        Ok(rows.into_iter().next().map(|row| row.seq))
    }
}

#[async_trait]
impl ResultStore for SurrealResultStore {
    #[instrument(skip(self, record), fields(session_id = %record.session_id))]
    async fn insert(&self, record: EvalRecord) -> StorageResult<()> {
        if record.session_id.trim().is_empty() {
            return Err(StorageError::InvalidRecord(
                "session_id must not be empty".to_string(),
            ));
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let row = EvalResultRow::new(record, seq);

        debug!(seq, "inserting eval result row");

        let _created: Option<EvalResultRow> = self
            .db
            .create("eval_results")
            .content(row)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %filter.session_id, run_id = ?filter.run_id))]
    async fn select(&self, filter: &RecordFilter) -> StorageResult<Vec<EvalRecord>> {
        let sid = filter.session_id.clone();
        let mut res = match &filter.run_id {
            Some(run_id) => self
                .db
                .query(
                    "SELECT * FROM eval_results WHERE session_id = $sid AND run_id = $rid ORDER BY seq ASC",
                )
                .bind(("sid", sid))
                .bind(("rid", run_id.clone()))
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?,
            None => self
                .db
                .query("SELECT * FROM eval_results WHERE session_id = $sid ORDER BY seq ASC")
                .bind(("sid", sid))
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?,
        };

        let rows: Vec<EvalResultRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        debug!(rows = rows.len(), "selected eval result rows");
        Ok(rows.into_iter().map(EvalResultRow::into_record).collect())
    }
}
