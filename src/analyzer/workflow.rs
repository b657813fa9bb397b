//! Submission workflow
//!
//! `WorkflowController` is the single public surface of the analyzer. It owns
//! the selected payload, the in-flight attempt and the latest result, and moves
//! between states only through the transitions below:
//!
//! ```text
//! Idle --select--> Ready --submit--> Submitting --> AwaitingResult --ok--> Rendering
//!                    ^                                    |
//!                    +------retry / select------ Failed <-+ err
//! Rendering --analyze_another--> Idle        any --close--> Idle
//! ```
//!
//! At most one exchange is in flight. The progress estimator runs beside the
//! exchange and is stopped on every exit path: success, failure, `close()`, or
//! the submit future being dropped.

use super::client::AnalysisService;
use super::progress::{ProgressEstimator, ProgressSender, ProgressStage};
use super::report::{Report, ReportRenderer};
use super::submission::{SubmissionBuilder, SubmissionRequest};
use super::types::AnalysisResult;
use super::validator::{Document, InputValidator, Payload, TextInput};
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, WorkflowError};
use crate::identity::IdentityProvider;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// Workflow state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Nothing selected
    #[default]
    Idle,
    /// Checking a candidate document (transient)
    Validating,
    /// A submittable payload is selected
    Ready,
    /// Request built, exchange starting
    Submitting,
    /// Exchange in flight
    AwaitingResult,
    /// Result available for display
    Rendering,
    /// Last exchange failed
    Failed,
}

impl WorkflowState {
    /// Whether a submission is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Submitting | Self::AwaitingResult)
    }
}

/// What happened to a submit action
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing to submit, or a submission is already in flight
    Skipped,
    /// Result received and rendered
    Rendered(Report),
    /// Exchange failed; the workflow is in `Failed`
    Failed(AnalysisError),
    /// The view was closed while waiting; the result was dropped
    Discarded,
}

/// Point-in-time view for a UI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub state: WorkflowState,
    pub progress: f64,
    pub stage: Option<ProgressStage>,
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Default)]
struct WorkflowInner {
    state: WorkflowState,
    payload: Payload,
    jurisdiction: Option<String>,
    result: Option<AnalysisResult>,
    report: Option<Report>,
    last_error: Option<AnalysisError>,
    /// Attempt currently allowed to deliver a result
    attempt: Option<Uuid>,
    estimator: Option<ProgressEstimator>,
}

impl WorkflowInner {
    /// State implied by the current payload when nothing is in flight
    fn settled_state(&self) -> WorkflowState {
        if self.payload.is_submittable() {
            WorkflowState::Ready
        } else {
            WorkflowState::Idle
        }
    }

    fn stop_estimator(&mut self) {
        if let Some(estimator) = self.estimator.take() {
            estimator.stop();
        }
    }
}

/// Drives validation, submission, progress and rendering for one session
#[derive(Clone)]
pub struct WorkflowController {
    inner: Arc<Mutex<WorkflowInner>>,
    service: Arc<dyn AnalysisService>,
    identity: Arc<dyn IdentityProvider>,
    progress: ProgressSender,
    progress_tick: Duration,
    progress_ceiling: f64,
}

impl WorkflowController {
    pub fn new(
        service: Arc<dyn AnalysisService>,
        identity: Arc<dyn IdentityProvider>,
        config: &AnalyzerConfig,
    ) -> Self {
        let (progress, _) = watch::channel(0.0);
        Self {
            inner: Arc::new(Mutex::new(WorkflowInner::default())),
            service,
            identity,
            progress: Arc::new(progress),
            progress_tick: config.progress_tick,
            progress_ceiling: config.progress_ceiling,
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> WorkflowState {
        self.lock().state
    }

    /// Current progress percentage
    pub fn progress(&self) -> f64 {
        *self.progress.borrow()
    }

    /// Receiver notified on every progress change
    pub fn subscribe_progress(&self) -> watch::Receiver<f64> {
        self.progress.subscribe()
    }

    /// The submit action is enabled
    pub fn can_submit(&self) -> bool {
        let inner = self.lock();
        inner.state == WorkflowState::Ready && inner.payload.is_submittable()
    }

    pub fn payload(&self) -> Payload {
        self.lock().payload.clone()
    }

    pub fn jurisdiction(&self) -> Option<String> {
        self.lock().jurisdiction.clone()
    }

    pub fn result(&self) -> Option<AnalysisResult> {
        self.lock().result.clone()
    }

    pub fn report(&self) -> Option<Report> {
        self.lock().report.clone()
    }

    pub fn last_error(&self) -> Option<AnalysisError> {
        self.lock().last_error.clone()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let inner = self.lock();
        let progress = self.progress();
        WorkflowSnapshot {
            state: inner.state,
            progress,
            stage: inner.state.is_busy().then(|| ProgressStage::from_percent(progress)),
            can_submit: inner.state == WorkflowState::Ready && inner.payload.is_submittable(),
            error_message: inner.last_error.as_ref().map(AnalysisError::user_message),
        }
    }

    /// Select a document, replacing any pending text
    pub fn select_document(&self, document: Document) -> Result<(), WorkflowError> {
        let mut inner = self.lock();
        if inner.state.is_busy() {
            return Err(WorkflowError::Busy);
        }

        let previous = inner.state;
        inner.state = WorkflowState::Validating;
        if let Err(e) = InputValidator::validate(&document) {
            inner.state = previous;
            tracing::info!("[Workflow] Document rejected: {}", e);
            return Err(e.into());
        }

        tracing::info!(
            "[Workflow] Document selected: {} ({}, {})",
            document.display_name,
            document.declared_mime_type,
            document.display_size()
        );
        inner.payload = Payload::Document(document);
        inner.state = inner.settled_state();
        Ok(())
    }

    /// Set pasted text, replacing any selected document.
    ///
    /// Blank text is accepted but leaves the workflow `Idle`.
    pub fn set_text(&self, text: impl Into<String>) -> Result<(), WorkflowError> {
        let mut inner = self.lock();
        if inner.state.is_busy() {
            return Err(WorkflowError::Busy);
        }

        inner.payload = Payload::Text(TextInput::new(text));
        inner.state = inner.settled_state();
        Ok(())
    }

    /// Drop the selected payload
    pub fn clear_payload(&self) -> Result<(), WorkflowError> {
        let mut inner = self.lock();
        if inner.state.is_busy() {
            return Err(WorkflowError::Busy);
        }

        inner.payload = Payload::None;
        inner.state = inner.settled_state();
        Ok(())
    }

    /// Choose the jurisdiction forwarded with the next submission
    pub fn set_jurisdiction(&self, jurisdiction: Option<&str>) {
        let mut inner = self.lock();
        inner.jurisdiction = jurisdiction
            .map(str::trim)
            .filter(|j| !j.is_empty())
            .map(str::to_string);
    }

    /// Submit the selected payload and wait for the exchange to resolve.
    ///
    /// A no-op (`Skipped`) unless the workflow is `Ready` with a submittable
    /// payload.
    pub async fn submit(&self) -> SubmitOutcome {
        let request = {
            let mut inner = self.lock();
            if inner.state != WorkflowState::Ready {
                tracing::debug!("[Workflow] Submit ignored in state {:?}", inner.state);
                return SubmitOutcome::Skipped;
            }

            let built = SubmissionBuilder::new(&inner.payload)
                .jurisdiction(inner.jurisdiction.as_deref())
                .identity(self.identity.identity_tag())
                .build();
            let request = match built {
                Ok(request) => request,
                Err(e) => {
                    tracing::debug!("[Workflow] Submit ignored: {}", e);
                    return SubmitOutcome::Skipped;
                }
            };

            inner.state = WorkflowState::Submitting;
            inner.attempt = Some(request.attempt_id);
            inner.last_error = None;

            self.progress.send_replace(0.0);
            inner.estimator = Some(ProgressEstimator::start(
                Arc::clone(&self.progress),
                self.progress_tick,
                self.progress_ceiling,
            ));
            inner.state = WorkflowState::AwaitingResult;
            request
        };

        let mut guard = AttemptGuard {
            controller: self,
            attempt: request.attempt_id,
            armed: true,
        };
        let outcome = self.service.submit(&request).await;
        guard.armed = false;

        self.resolve(&request, outcome)
    }

    fn resolve(
        &self,
        request: &SubmissionRequest,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> SubmitOutcome {
        let attempt = request.attempt_id;
        let elapsed_ms = request.elapsed_ms();
        let mut inner = self.lock();
        if inner.attempt != Some(attempt) {
            tracing::info!(
                "[Workflow] Dropping result of abandoned attempt {} ({}ms)",
                attempt,
                elapsed_ms
            );
            return SubmitOutcome::Discarded;
        }

        inner.attempt = None;
        inner.stop_estimator();

        match outcome {
            Ok(result) => {
                self.progress.send_replace(100.0);
                let report = ReportRenderer::render(&result);
                tracing::info!(
                    "[Workflow] Analysis complete in {}ms: score {} ({} band, {} sections)",
                    elapsed_ms,
                    report.score,
                    report.band.as_str(),
                    report.sections.len()
                );
                inner.result = Some(result);
                inner.report = Some(report.clone());
                inner.state = WorkflowState::Rendering;
                SubmitOutcome::Rendered(report)
            }
            Err(error) => {
                self.progress.send_replace(0.0);
                tracing::warn!("[Workflow] Analysis failed after {}ms: {}", elapsed_ms, error);
                inner.last_error = Some(error.clone());
                inner.state = WorkflowState::Failed;
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Leave `Failed` for `Ready` so the user can submit again
    pub fn retry(&self) -> bool {
        let mut inner = self.lock();
        if inner.state != WorkflowState::Failed || !inner.payload.is_submittable() {
            return false;
        }
        inner.last_error = None;
        inner.state = WorkflowState::Ready;
        true
    }

    /// Clear payload and result together and return to `Idle`
    pub fn analyze_another(&self) -> bool {
        let mut inner = self.lock();
        if inner.state.is_busy() {
            return false;
        }
        inner.payload = Payload::None;
        inner.result = None;
        inner.report = None;
        inner.last_error = None;
        inner.state = WorkflowState::Idle;
        self.progress.send_replace(0.0);
        true
    }

    /// Close the view. Any in-flight result will be dropped; reopening starts
    /// from a clean `Idle`.
    pub fn close(&self) {
        let mut inner = self.lock();
        if let Some(attempt) = inner.attempt.take() {
            tracing::info!("[Workflow] Closed with attempt {} in flight", attempt);
        }
        inner.stop_estimator();
        *inner = WorkflowInner::default();
        self.progress.send_replace(0.0);
    }
}

/// Restores a settled state if the submit future is dropped mid-exchange
struct AttemptGuard<'a> {
    controller: &'a WorkflowController,
    attempt: Uuid,
    armed: bool,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.controller.lock();
        if inner.attempt != Some(self.attempt) {
            return;
        }
        tracing::info!("[Workflow] Attempt {} abandoned", self.attempt);
        inner.attempt = None;
        inner.stop_estimator();
        inner.state = inner.settled_state();
        self.controller.progress.send_replace(0.0);
    }
}
