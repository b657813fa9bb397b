//! Submission assembly
//!
//! Builds the immutable request for one analysis attempt from the current
//! payload, the optional jurisdiction and the optional identity.

use super::validator::{Document, Payload};
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Jurisdictions offered to users. Any other tag is still forwarded as-is.
pub const KNOWN_JURISDICTIONS: &[&str] = &[
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Andaman and Nicobar Islands",
    "Chandigarh",
    "Dadra and Nagar Haveli and Daman and Diu",
    "Delhi",
    "Jammu and Kashmir",
    "Ladakh",
    "Lakshadweep",
    "Puducherry",
];

/// Case-insensitive lookup in the known jurisdiction list
pub fn find_jurisdiction(name: &str) -> Option<&'static str> {
    let name = name.trim();
    KNOWN_JURISDICTIONS
        .iter()
        .copied()
        .find(|j| j.eq_ignore_ascii_case(name))
}

/// Content of a submission: exactly one of a document or text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPayload {
    Document(Document),
    Text(String),
}

/// One analysis attempt, immutable once built
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// Correlates log lines and the eventual response with this attempt
    pub attempt_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub payload: SubmissionPayload,
    pub jurisdiction_tag: Option<String>,
    pub identity_tag: Option<String>,
}

impl SubmissionRequest {
    /// Short description for logs (never includes content)
    pub fn describe(&self) -> String {
        match &self.payload {
            SubmissionPayload::Document(doc) => format!(
                "document '{}' ({}, {} bytes)",
                doc.display_name, doc.declared_mime_type, doc.declared_size
            ),
            SubmissionPayload::Text(text) => format!("text ({} chars)", text.chars().count()),
        }
    }

    /// Milliseconds since the request was built
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.created_at).num_milliseconds().max(0)
    }
}

/// Assembles a `SubmissionRequest`
#[derive(Debug, Default)]
pub struct SubmissionBuilder<'a> {
    payload: Option<&'a Payload>,
    jurisdiction: Option<&'a str>,
    identity: Option<String>,
}

impl<'a> SubmissionBuilder<'a> {
    pub fn new(payload: &'a Payload) -> Self {
        Self {
            payload: Some(payload),
            jurisdiction: None,
            identity: None,
        }
    }

    /// Only attached when the user explicitly chose a non-blank value
    pub fn jurisdiction(mut self, jurisdiction: Option<&'a str>) -> Self {
        self.jurisdiction = jurisdiction;
        self
    }

    /// Only attached for signed-in users
    pub fn identity(mut self, identity: Option<String>) -> Self {
        self.identity = identity;
        self
    }

    pub fn build(self) -> Result<SubmissionRequest, ValidationError> {
        let payload = match self.payload {
            Some(Payload::Document(doc)) => SubmissionPayload::Document(doc.clone()),
            Some(Payload::Text(text)) if !text.is_blank() => {
                SubmissionPayload::Text(text.as_str().to_string())
            }
            _ => return Err(ValidationError::EmptyPayload),
        };

        Ok(SubmissionRequest {
            attempt_id: Uuid::new_v4(),
            created_at: Utc::now(),
            payload,
            jurisdiction_tag: non_blank(self.jurisdiction),
            identity_tag: non_blank(self.identity.as_deref()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::validator::TextInput;

    #[test]
    fn test_build_requires_payload() {
        assert_eq!(
            SubmissionBuilder::new(&Payload::None).build().unwrap_err(),
            ValidationError::EmptyPayload
        );
        assert_eq!(
            SubmissionBuilder::new(&Payload::Text(TextInput::new("  \n ")))
                .build()
                .unwrap_err(),
            ValidationError::EmptyPayload
        );
        assert!(SubmissionBuilder::default().build().is_err());
    }

    #[test]
    fn test_text_submission_without_tags() {
        let payload = Payload::Text(TextInput::new("Tenant shall pay rent monthly."));
        let request = SubmissionBuilder::new(&payload).build().unwrap();

        assert_eq!(
            request.payload,
            SubmissionPayload::Text("Tenant shall pay rent monthly.".to_string())
        );
        assert_eq!(request.jurisdiction_tag, None);
        assert_eq!(request.identity_tag, None);
    }

    #[test]
    fn test_document_submission_with_tags() {
        let payload = Payload::Document(Document::new("lease.pdf", "application/pdf", vec![1, 2, 3]));
        let request = SubmissionBuilder::new(&payload)
            .jurisdiction(Some("Karnataka"))
            .identity(Some("tenant@example.com".to_string()))
            .build()
            .unwrap();

        assert!(matches!(request.payload, SubmissionPayload::Document(_)));
        assert_eq!(request.jurisdiction_tag.as_deref(), Some("Karnataka"));
        assert_eq!(request.identity_tag.as_deref(), Some("tenant@example.com"));
        assert!(request.describe().contains("lease.pdf"));
    }

    #[test]
    fn test_blank_tags_are_omitted() {
        let payload = Payload::Text(TextInput::new("lease"));
        let request = SubmissionBuilder::new(&payload)
            .jurisdiction(Some("   "))
            .identity(Some(String::new()))
            .build()
            .unwrap();

        assert_eq!(request.jurisdiction_tag, None);
        assert_eq!(request.identity_tag, None);
    }

    #[test]
    fn test_each_build_is_a_new_attempt() {
        let payload = Payload::Text(TextInput::new("lease"));
        let first = SubmissionBuilder::new(&payload).build().unwrap();
        let second = SubmissionBuilder::new(&payload).build().unwrap();
        assert_ne!(first.attempt_id, second.attempt_id);
    }

    #[test]
    fn test_elapsed_since_build() {
        let payload = Payload::Text(TextInput::new("lease"));
        let mut request = SubmissionBuilder::new(&payload).build().unwrap();
        assert!(request.created_at <= Utc::now());
        assert!(request.elapsed_ms() >= 0);

        request.created_at = Utc::now() - chrono::Duration::seconds(3);
        assert!(request.elapsed_ms() >= 3000);
    }

    #[test]
    fn test_find_jurisdiction() {
        assert_eq!(find_jurisdiction(" tamil nadu "), Some("Tamil Nadu"));
        assert_eq!(find_jurisdiction("Atlantis"), None);
        assert_eq!(KNOWN_JURISDICTIONS.len(), 36);
    }
}
