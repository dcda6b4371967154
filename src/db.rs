// src/db.rs

pub mod store;
pub use store::{from_record, record_id, to_record, Collection, Record, RecordStore, WriteOp};
pub mod json_store;
pub use json_store::JsonFileStore;
pub mod pg_store;
pub use pg_store::PgRecordStore;
