pub mod licensed;
pub mod mock;

pub use licensed::LicensedCli;
pub use mock::MockLicenseTool;

use anyhow::Result;
use async_trait::async_trait;

/// Outcome of a status check run.
#[derive(Debug, Clone)]
pub struct StatusOutcome {
    pub success: bool,
    pub log: String,
}

/// Driver for the external license scanning tool.
///
/// `LicensedCli` shells out to the configured command; `MockLicenseTool` is
/// scripted by tests.
#[async_trait]
pub trait LicenseTool: Send + Sync {
    /// Regenerate cached metadata. A non-zero exit is fatal.
    async fn cache(&self) -> Result<()>;

    /// Verify cached metadata against the current dependency state.
    /// A failing check is the drift signal, not an error.
    async fn status(&self) -> Result<StatusOutcome>;

    /// Repository-relative paths holding cached metadata, falling back to
    /// the repository root when the tool cannot report them.
    async fn cache_paths(&self) -> Vec<String>;
}
