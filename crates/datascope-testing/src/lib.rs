//! Testing infrastructure for datascope integration tests.
//!
//! - `ScriptedService`: an in-memory `DataService` built from
//!   declarative fixtures, with failure injection for error-surface
//!   tests and call recording for interaction assertions
//! - `fixtures`: ready-made service shapes (relational 3-level,
//!   object-store 2-level, document-store 2-level)

pub mod fixtures;
pub mod scripted;

pub use fixtures::{
    document_store_capabilities, document_store_service, object_store_capabilities,
    object_store_service, relational_capabilities, relational_service,
};
pub use scripted::{RecordedQuery, ScriptedService};
