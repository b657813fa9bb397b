pub mod analyzer;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;

pub use analyzer::{AnalysisClient, WorkflowController};
pub use config::AnalyzerConfig;
pub use error::{AnalysisError, ValidationError, WorkflowError};

use tracing_subscriber::EnvFilter;

/// Install the tracing subscriber.
///
/// Default: warn for dependencies, info for this crate. `RUST_LOG=debug` for
/// per-request logs. With `verbose`, debug is the default instead.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,lease_analyzer=debug"
    } else {
        "warn,lease_analyzer=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
