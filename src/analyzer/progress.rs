//! Cosmetic progress estimation
//!
//! The analysis service does not report incremental progress. While a request
//! is in flight, the estimator nudges a percentage upward by random steps and
//! holds at a soft ceiling. It never reaches 100 on its own; only the workflow
//! sets 100 once a result has actually arrived.
//!
//! The estimator is a scoped resource: dropping it (or calling `stop`) cancels
//! the timer task, and any tick racing with the stop becomes a no-op.

use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Smallest and largest step per tick, in percentage points
const MIN_INCREMENT: f64 = 0.5;
const MAX_INCREMENT: f64 = 10.0;

/// Shared progress channel (percentage, 0.0-100.0)
pub type ProgressSender = Arc<watch::Sender<f64>>;

/// Label shown next to the progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    ProcessingDocument,
    AnalyzingClauses,
    CheckingCompliance,
    GeneratingReport,
}

impl ProgressStage {
    pub fn from_percent(percent: f64) -> Self {
        if percent > 80.0 {
            Self::GeneratingReport
        } else if percent > 50.0 {
            Self::CheckingCompliance
        } else if percent > 20.0 {
            Self::AnalyzingClauses
        } else {
            Self::ProcessingDocument
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::ProcessingDocument => "Processing document...",
            Self::AnalyzingClauses => "Analyzing clauses...",
            Self::CheckingCompliance => "Checking legal compliance...",
            Self::GeneratingReport => "Generating report...",
        }
    }
}

/// Repeating timer task that advances the progress estimate
pub struct ProgressEstimator {
    handle: JoinHandle<()>,
    active: Arc<AtomicBool>,
}

impl ProgressEstimator {
    /// Spawn the timer task. Must be called inside a Tokio runtime.
    pub fn start(progress: ProgressSender, tick: Duration, ceiling: f64) -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let task_active = Arc::clone(&active);

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(tick).await;

                let increment = rand::rng().random_range(MIN_INCREMENT..MAX_INCREMENT);
                let mut held = false;
                progress.send_if_modified(|value| {
                    // Checked under the channel lock so a late tick cannot
                    // overwrite the final value set after stop()
                    if !task_active.load(Ordering::SeqCst) {
                        held = true;
                        return false;
                    }
                    let next = (*value + increment).min(ceiling);
                    held = next >= ceiling;
                    if next > *value {
                        *value = next;
                        true
                    } else {
                        false
                    }
                });

                if held {
                    tracing::trace!("[Progress] Holding at {:.0}%", ceiling);
                    break;
                }
            }
        });

        Self { handle, active }
    }

    /// Cancel the timer. No tick takes effect after this returns.
    pub fn stop(self) {
        // Drop does the work
    }

    /// Whether the timer task has stopped ticking
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ProgressEstimator {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        self.handle.abort();
    }
}
