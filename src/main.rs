use clap::Parser;
use lease_analyzer::commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing so `.env` values reach clap's env fallbacks
    lease_analyzer::config::load_dotenv();

    let cli = Cli::parse();
    lease_analyzer::init_tracing(cli.verbose);
    lease_analyzer::commands::run(cli).await
}
