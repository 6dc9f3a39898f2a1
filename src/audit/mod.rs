//! Structured audit logging.
//!
//! Each hook invocation emits `scan_completed`, `decision_made` and, when a
//! protocol ran, `remediation_completed` events on the `secretgate::audit`
//! tracing target. Any subscriber can capture them; the binary writes them
//! to the configured log file alongside diagnostic output.

mod events;

pub use events::{
    emit_decision_made, emit_remediation_completed, emit_scan_completed, AuditEvent,
    DecisionAuditEvent, FindingSummary, RemediationAuditEvent, ScanAuditEvent, StrategyOutcome,
    AUDIT_TARGET,
};
