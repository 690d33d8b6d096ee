//! Audit logging for Budget Saver
//!
//! Every create, update and delete of a category, a transaction or the
//! settings is appended to `audit.log` with the before/after JSON of the
//! entity. Entries are written only after the change has been saved.

mod diff;
mod entry;
mod logger;

pub use diff::describe_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
