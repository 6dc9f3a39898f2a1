//! Core types and traits for the secretgate library.
//!
//! - [`types`] - Findings, scan results, decisions and hook payloads
//! - [`severity`] - The severity ordering shared by every threshold check
//! - [`traits`] - The `Scanner` trait
//! - [`error`] - Structured error types

pub mod error;
pub mod severity;
pub mod traits;
pub mod types;

pub(crate) use types::duration_ms;

pub use error::{
    ConfigError, FrameworkError, ProcessError, RegistryError, ScanError, StrategyError,
};
pub use severity::{meets_threshold, severity_level, Severity};
pub use traits::{ArcScanner, Scanner};
pub use types::{Decision, Finding, HookInput, ScanContent, ScanResults};
