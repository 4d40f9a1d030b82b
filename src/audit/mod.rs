//! Audit logging for Cifra
//!
//! Every create, update and delete of a profile, category, expense or whole
//! month is appended to `audit.log` as one JSON line with before/after
//! values.
//!
//! - `AuditEntry`: one operation on one entity.
//! - `AuditLogger`: appends entries and reads them back.
//! - `generate_diff`: summarizes which fields an update changed.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
