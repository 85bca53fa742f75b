//! Storage module: artifact objects and business records

pub mod traits;
pub mod local;
pub mod sqlite;

pub use traits::{ObjectStore, RecordStore, artifact_key};
pub use local::LocalObjectStore;
pub use sqlite::{SqliteRecordStore, BusinessRecord};
