//! Hook framework adapters.
//!
//! A framework turns the raw bytes an AI coding assistant sends to a hook
//! into a [`HookInput`], picks a [`HookHandler`] to pull out the content to
//! scan, and renders the final [`Decision`] into the envelope the assistant
//! expects on stdout.
//!
//! - [`claude`] - Claude Code hooks (`UserPromptSubmit`)
//! - [`registry`] - Name-keyed framework lookup

pub mod claude;
pub mod registry;

pub use claude::{ClaudeFramework, UserPromptSubmitHandler, CLAUDE_FRAMEWORK_NAME};
pub use registry::FrameworkRegistry;

use crate::core::error::FrameworkResult;
use crate::core::{Decision, HookInput, ScanContent};

use std::fmt::Debug;
use std::sync::Arc;

/// Adapter between a hook-calling tool and the scanning pipeline.
pub trait HookFramework: Send + Sync + Debug {
    /// Returns the framework identifier used on the command line.
    fn name(&self) -> &str;

    /// Parses the raw hook payload.
    fn parse_input(&self, input: &[u8]) -> FrameworkResult<HookInput>;

    /// Extracts the content to scan using the first handler that accepts
    /// the input.
    fn extract_content(&self, input: &HookInput) -> FrameworkResult<ScanContent>;

    /// Renders the decision into the framework's response envelope.
    fn format_output(&self, decision: &Decision, input: &HookInput) -> FrameworkResult<Vec<u8>>;

    /// Returns the process exit code for a decision.
    fn exit_code(&self, decision: &Decision) -> i32;
}

/// Extracts scan content for one hook event type.
pub trait HookHandler: Send + Sync + Debug {
    /// Returns the hook event type this handler serves.
    fn hook_type(&self) -> &str;

    /// Returns `true` if this handler accepts the input.
    fn can_handle(&self, input: &HookInput) -> bool;

    /// Pulls the content to scan out of the payload.
    fn extract_content(&self, input: &HookInput) -> FrameworkResult<ScanContent>;
}

/// An arc-wrapped framework for shared ownership.
pub type ArcFramework = Arc<dyn HookFramework>;
