//! Audit trail for pipeline runs
//!
//! One line per run. Entity values are recorded only as SHA-256 digests.

pub mod logger;

pub use logger::{AuditLogger, AuditRecord};
