//! `health` and `jurisdictions` commands.

use console::style;

use crate::analyzer::{AnalysisClient, KNOWN_JURISDICTIONS};
use crate::config::AnalyzerConfig;

/// Query the service health endpoint and report the result
pub async fn cmd_health(config: AnalyzerConfig) -> anyhow::Result<()> {
    let client = AnalysisClient::new(config);
    let url = client.config().health_url();

    let status = match client.health().await {
        Ok(status) => status,
        Err(e) => {
            println!("{} {} unreachable", style("✗").red(), url);
            anyhow::bail!(e.user_message());
        }
    };

    let marker = if status.is_healthy() {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!("{} {}", marker, url);
    let state = if status.status.is_empty() {
        "unknown"
    } else {
        status.status.as_str()
    };
    println!("  {:<10} {}", "Status:", state);
    if let Some(database) = &status.database {
        println!("  {:<10} {}", "Database:", database);
    }
    if let Some(message) = status.message.as_deref().or(status.error.as_deref()) {
        println!("  {:<10} {}", "Message:", message);
    }

    if !status.is_healthy() {
        anyhow::bail!("Analysis service is not healthy");
    }
    Ok(())
}

pub fn cmd_jurisdictions() {
    println!("{}", style("States and union territories").bold());
    println!("{}", "-".repeat(40));
    for name in KNOWN_JURISDICTIONS {
        println!("  {}", name);
    }
    println!(
        "\n{} Other values are forwarded unchanged.",
        style("i").cyan()
    );
}
