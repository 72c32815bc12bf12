//! Models module for the SDK
//!
//! Defines the dialect-neutral diagram structures produced by SQL import and
//! consumed by the exporters. Field names serialize in camelCase.

pub mod custom_type;
pub mod data_type;
pub mod diagram;
pub mod enums;
pub mod field;
pub mod index;
pub mod relationship;
pub mod table;

pub use custom_type::{DBCustomType, DBCustomTypeField};
pub use data_type::{DataType, TypeArgsKind};
pub use diagram::Diagram;
pub use enums::*;
pub use field::DBField;
pub use index::DBIndex;
pub use relationship::DBRelationship;
pub use table::DBTable;

use uuid::Uuid;

/// Fresh entity id (uuid v4, hyphen-less)
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
