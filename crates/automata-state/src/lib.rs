//! Automata-State: evaluation result persistence
//!
//! This crate provides the persistence layer for the evaluation harness.
//! It owns all I/O with SurrealDB and the text codec used to flatten nested
//! results into a single column.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: append-only writes, filtered reads, lossless payload encoding.
//!
//! ## Key Components
//!
//! - `Payload` / `encode` / `decode`: tagged nested values and their text form
//! - `ResultStore`: append-only result table abstraction
//! - `SurrealResultStore`: SurrealDB implementation (`mem://`, `surrealkv://`, `ws://`)
//! - `fakes::MemoryResultStore`: in-memory implementation for tests

pub mod config;
mod error;
pub mod fakes;
mod migrations;
pub mod payload;
mod schema;
pub mod storage_traits;
mod surreal_store;

pub use config::{Credentials, StoreConfig, DEFAULT_DB_URL};
pub use error::{CodecError, StorageError};
pub use payload::{decode, encode, Payload, PayloadMap};
pub use schema::EvalResultRow;
pub use storage_traits::{EvalRecord, RecordFilter, ResultStore, StorageResult};
pub use surreal_store::SurrealResultStore;
