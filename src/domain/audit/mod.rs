//! Audit trail aggregate.

pub mod model;

pub use model::{AuditAction, AuditEntry, AuditOutcome, NewAuditEntry};
