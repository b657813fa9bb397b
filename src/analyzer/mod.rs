pub mod client;
pub mod progress;
pub mod report;
pub mod submission;
pub mod types;
pub mod validator;
pub mod workflow;

pub use client::{AnalysisClient, AnalysisService};
pub use progress::{ProgressEstimator, ProgressStage};
pub use report::{Report, ReportRenderer, ReportSection, RiskBand, SectionKind};
pub use submission::{SubmissionBuilder, SubmissionPayload, SubmissionRequest, KNOWN_JURISDICTIONS};
pub use types::*;
pub use validator::{Document, DocumentKind, InputValidator, Payload, TextInput};
pub use workflow::{SubmitOutcome, WorkflowController, WorkflowSnapshot, WorkflowState};
