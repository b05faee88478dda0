//! SurrealDB row types for the result store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage_traits::EvalRecord;

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Row in the `eval_results` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResultRow {
    /// SurrealDB record ID
    pub id: Option<surrealdb::sql::Thing>,
    /// Session the result belongs to (never empty)
    pub session_id: String,
    /// Optional run within the session
    pub run_id: Option<String>,
    /// Codec-encoded evaluation result
    pub eval_result: String,
    /// Insertion sequence, used only for ordering
    pub seq: u64,
    /// Insertion timestamp
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl EvalResultRow {
    /// Build a row for `record` at insertion position `seq`
    pub fn new(record: EvalRecord, seq: u64) -> Self {
        EvalResultRow {
            id: None,
            session_id: record.session_id,
            run_id: record.run_id,
            eval_result: record.eval_result,
            seq,
            created_at: Utc::now(),
        }
    }

    pub fn into_record(self) -> EvalRecord {
        EvalRecord {
            session_id: self.session_id,
            run_id: self.run_id,
            eval_result: self.eval_result,
        }
    }
}

/// Projection used to recover the last sequence number on connect
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SeqRow {
    pub seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_keeps_record_fields() {
        let record = EvalRecord::new("session-1", Some("run-1".to_string()), "{}");
        let row = EvalResultRow::new(record.clone(), 7);
        assert_eq!(row.seq, 7);
        assert!(row.id.is_none());
        assert_eq!(row.into_record(), record);
    }
}
