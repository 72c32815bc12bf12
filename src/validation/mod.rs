//! Validation functionality
//!
//! Provides validation logic for:
//! - Diagram integrity (dangling index and relationship references)
//! - Table validation (naming conflicts)
//! - Relationship validation (self references, cycles, dependency order)

pub mod diagram;
pub mod relationships;
pub mod tables;

pub use diagram::validate_diagram;
pub use relationships::{CircularDependency, RelationshipValidator, SelfReference};
pub use tables::{NamingConflict, TableValidator};
