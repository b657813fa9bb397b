//! `analyze` command: submit a lease and print the report.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgGroup, Args};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncReadExt;

use crate::analyzer::submission::find_jurisdiction;
use crate::analyzer::{
    AnalysisClient, Document, ProgressStage, SubmitOutcome, TextInput, WorkflowController,
};
use crate::config::AnalyzerConfig;
use crate::identity::{IdentityProvider, StaticIdentity};

use super::display::render_report;
use super::open_session;

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["file", "text", "text_file"]),
))]
pub struct AnalyzeArgs {
    /// Lease document to upload (PDF, Word, plain text, RTF, JPEG or PNG)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Lease text to analyze
    #[arg(long)]
    text: Option<String>,

    /// Read lease text from a file ("-" for stdin)
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// State or union territory whose rules apply
    #[arg(short, long)]
    state: Option<String>,

    /// Identity tag to attach instead of the signed-in session
    #[arg(long)]
    identity: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn cmd_analyze(config: AnalyzerConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let identity: Arc<dyn IdentityProvider> = match args.identity {
        Some(tag) => Arc::new(StaticIdentity(tag)),
        None => Arc::new(open_session()?),
    };

    let client = AnalysisClient::new(config.clone());
    let workflow = WorkflowController::new(Arc::new(client), identity, &config);

    if let Some(state) = args.state.as_deref() {
        match find_jurisdiction(state) {
            Some(known) => workflow.set_jurisdiction(Some(known)),
            None => {
                println!(
                    "{} '{}' is not a known state or union territory; sending as-is",
                    style("!").yellow(),
                    state
                );
                workflow.set_jurisdiction(Some(state));
            }
        }
    }

    if let Some(path) = &args.file {
        let document = Document::load(path).await?;
        println!(
            "{} {} ({}, {})",
            style("→").cyan(),
            document.display_name,
            document.kind().label(),
            document.display_size()
        );
        workflow.select_document(document)?;
    } else {
        let text = match (&args.text, &args.text_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => read_text(path).await?,
            (None, None) => String::new(),
        };
        let input = TextInput::new(text);
        println!(
            "{} Pasted text ({} characters, {} words)",
            style("→").cyan(),
            input.char_count(),
            input.word_count()
        );
        workflow.set_text(input.0)?;
    }

    if !workflow.can_submit() {
        anyhow::bail!("Nothing to analyze: the lease text is empty");
    }

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:30} [{bar:30.cyan/blue}] {pos}%")?
            .progress_chars("█▓░"),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar.set_message(ProgressStage::ProcessingDocument.message());

    let mut progress = workflow.subscribe_progress();
    let bar_task = {
        let bar = bar.clone();
        tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let percent = *progress.borrow_and_update();
                bar.set_position(percent.round() as u64);
                bar.set_message(ProgressStage::from_percent(percent).message());
            }
        })
    };

    let outcome = tokio::select! {
        outcome = workflow.submit() => outcome,
        _ = tokio::signal::ctrl_c() => {
            workflow.close();
            bar_task.abort();
            bar.abandon_with_message("Cancelled");
            return Ok(());
        }
    };
    bar_task.abort();

    match outcome {
        SubmitOutcome::Rendered(report) => {
            bar.finish_and_clear();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render_report(&report));
            }
            Ok(())
        }
        SubmitOutcome::Failed(error) => {
            bar.abandon_with_message("Analysis failed");
            tracing::debug!("[Analyze] {}", error);
            eprintln!("{} {}", style("✗").red(), error.user_message());
            anyhow::bail!(error)
        }
        SubmitOutcome::Skipped | SubmitOutcome::Discarded => {
            bar.finish_and_clear();
            anyhow::bail!("Nothing was submitted")
        }
    }
}

async fn read_text(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }
    Ok(tokio::fs::read_to_string(path).await?)
}
