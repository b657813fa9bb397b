//! CLI commands
//!
//! Parser and dispatch for the `lease-analyzer` binary. Each subcommand lives
//! in its own module.

mod analyze;
mod display;
mod service;
mod session;

use clap::{Parser, Subcommand};

use crate::config::{parse_timeout, AnalyzerConfig, API_URL_ENV, TIMEOUT_ENV};
use crate::identity::SessionIdentity;

pub use analyze::AnalyzeArgs;
pub use display::render_report;

#[derive(Parser, Debug)]
#[command(name = "lease-analyzer")]
#[command(about = "Check a lease agreement for risky clauses")]
#[command(version)]
pub struct Cli {
    /// Base URL of the analysis service
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Request timeout in seconds (0 waits indefinitely)
    #[arg(long, global = true, env = TIMEOUT_ENV)]
    timeout: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a lease document or text for analysis
    Analyze(AnalyzeArgs),

    /// Check that the analysis service is reachable
    Health,

    /// List the states and union territories offered for submissions
    Jurisdictions,

    /// Manage the signed-in identity attached to submissions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[derive(Subcommand, Debug)]
enum SessionCommands {
    /// Show the current identity
    Show,
    /// Sign in with an identity tag (e.g. an email address)
    Login {
        identity: String,
    },
    /// Sign out
    Logout,
}

impl Cli {
    /// Analyzer configuration with CLI and environment overrides applied
    pub fn config(&self) -> anyhow::Result<AnalyzerConfig> {
        let mut config = AnalyzerConfig::default();
        if let Some(url) = self.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url)?;
        }
        if let Some(raw) = &self.timeout {
            config = config.with_timeout(parse_timeout(raw)?);
        }
        Ok(config)
    }
}

/// Run the parsed command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config()?;
    tracing::debug!("[CLI] Using analysis service at {}", config.api_base_url);

    match cli.command {
        Commands::Analyze(args) => analyze::cmd_analyze(config, args).await,
        Commands::Health => service::cmd_health(config).await,
        Commands::Jurisdictions => {
            service::cmd_jurisdictions();
            Ok(())
        }
        Commands::Session { command } => match command {
            SessionCommands::Show => session::cmd_show(),
            SessionCommands::Login { identity } => session::cmd_login(&identity),
            SessionCommands::Logout => session::cmd_logout(),
        },
    }
}

/// Open the persisted session, falling back to an in-memory one when the
/// platform has no config directory
pub(crate) fn open_session() -> anyhow::Result<SessionIdentity> {
    match SessionIdentity::default_path() {
        Some(path) => Ok(SessionIdentity::init(path)?),
        None => {
            tracing::warn!("[CLI] No config directory; session will not persist");
            Ok(SessionIdentity::in_memory())
        }
    }
}
