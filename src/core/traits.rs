//! Core traits for the secretgate library.
//!
//! This module defines the `Scanner` trait that every secret-scanning
//! backend implements.

use crate::core::error::ScanError;
use crate::core::types::{ScanContent, ScanResults};

use async_trait::async_trait;
use std::fmt::Debug;

/// The core trait for secret-scanning backends.
///
/// # Implementation Notes
///
/// - Implementations must be `Send + Sync` so a processor can hold them
///   behind an `Arc`.
/// - A failed scan should be reported as `Err`; the processor converts it
///   into [`ScanResults::failed`] so the decision policy can fail open.
/// - Implementations should never panic.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use secretgate::core::{Scanner, ScanContent, ScanResults, ScanError};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct NoopScanner;
///
/// #[async_trait]
/// impl Scanner for NoopScanner {
///     fn name(&self) -> &str {
///         "noop"
///     }
///
///     async fn scan(&self, _content: &ScanContent) -> Result<ScanResults, ScanError> {
///         Ok(ScanResults::clean(std::time::Duration::ZERO))
///     }
/// }
/// ```
#[async_trait]
pub trait Scanner: Send + Sync + Debug {
    /// Returns a stable identifier like "vault-radar".
    fn name(&self) -> &str;

    /// Scans the given content for secrets.
    ///
    /// # Errors
    ///
    /// - `CommandFailed` - the scanner could not be run.
    /// - `Timeout` - the scan exceeded its time budget.
    /// - `Io` - temporary files could not be prepared.
    async fn scan(&self, content: &ScanContent) -> Result<ScanResults, ScanError>;
}

/// An arc-wrapped scanner for shared ownership.
pub type ArcScanner = std::sync::Arc<dyn Scanner>;
