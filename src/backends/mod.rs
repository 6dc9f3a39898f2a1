//! Secret-scanning backend implementations.
//!
//! ## Available Backends
//!
//! - [`vault_radar`] - The HashiCorp Vault Radar CLI, run as a subprocess
//! - [`mock`] - A mock scanner for testing
//!
//! ## Implementing a Custom Backend
//!
//! ```rust,ignore
//! use secretgate::core::{Scanner, ScanContent, ScanResults, ScanError};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! pub struct MyScanner;
//!
//! #[async_trait]
//! impl Scanner for MyScanner {
//!     fn name(&self) -> &str {
//!         "my-scanner"
//!     }
//!
//!     async fn scan(&self, content: &ScanContent) -> Result<ScanResults, ScanError> {
//!         todo!()
//!     }
//! }
//! ```

pub mod mock;
pub mod vault_radar;

pub use mock::MockScanner;
pub use vault_radar::{parse_findings, VaultRadarScanner, VAULT_RADAR_SCANNER_NAME};
