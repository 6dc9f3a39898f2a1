//! The block/allow decision and its remediation enrichment.
//!
//! [`DecisionEngine`] filters findings by severity and decides whether to
//! block. [`enrich_with_remediation`] later appends a summary of remediation
//! outcomes to the decision's reason without touching the verdict.

mod engine;
mod enrich;

pub use engine::{build_reason, DecisionEngine};
pub use enrich::{enrich_with_remediation, format_duration, remediation_summary};
