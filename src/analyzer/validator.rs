//! Input validation
//!
//! Checks a candidate document against the size limit and the MIME allow-list
//! before anything touches the network. Pasted text is always structurally
//! acceptable; emptiness is only enforced when the user submits.

use crate::error::ValidationError;
use serde::Serialize;
use std::path::Path;

/// Maximum accepted document size (10 MiB, inclusive)
pub const MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Accepted MIME types (normalized form)
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "text/rtf",
    "image/jpeg",
    "image/png",
    "image/jpg",
];

/// Broad document family, derived from the MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Word,
    Text,
    Rtf,
    Image,
    Other,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Self {
        let mime = normalize_mime(mime);
        if mime.contains("pdf") {
            Self::Pdf
        } else if mime.contains("rtf") {
            Self::Rtf
        } else if mime.contains("word") || mime.contains("document") {
            Self::Word
        } else if mime.starts_with("text/") {
            Self::Text
        } else if mime.starts_with("image/") {
            Self::Image
        } else {
            Self::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Word => "Word document",
            Self::Text => "Text",
            Self::Rtf => "Rich text",
            Self::Image => "Image",
            Self::Other => "Document",
        }
    }
}

/// A user-selected binary document
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub declared_size: u64,
    pub declared_mime_type: String,
    pub display_name: String,
}

impl std::fmt::Debug for Document {
    // Never dump document contents into logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("display_name", &self.display_name)
            .field("declared_size", &self.declared_size)
            .field("declared_mime_type", &self.declared_mime_type)
            .finish()
    }
}

impl Document {
    /// Document whose declared size is the byte length
    pub fn new(display_name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            declared_size: bytes.len() as u64,
            bytes,
            declared_mime_type: mime_type.to_string(),
            display_name: display_name.to_string(),
        }
    }

    /// Load a document from disk, guessing its MIME type from the extension.
    ///
    /// Size and type are checked before the file is read.
    pub async fn load(path: &Path) -> Result<Self, DocumentLoadError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| DocumentLoadError::Io(format!("{}: {}", path.display(), e)))?;
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();

        InputValidator::check_declared(metadata.len(), &mime_type)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DocumentLoadError::Io(format!("{}: {}", path.display(), e)))?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        Ok(Self {
            declared_size: metadata.len(),
            bytes,
            declared_mime_type: mime_type,
            display_name,
        })
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_mime(&self.declared_mime_type)
    }

    pub fn display_size(&self) -> String {
        format_file_size(self.declared_size)
    }
}

/// Failure loading a document from disk
#[derive(Debug, thiserror::Error)]
pub enum DocumentLoadError {
    #[error("Failed to read document {0}")]
    Io(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Text pasted directly by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput(pub String);

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when nothing but whitespace was entered
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

/// The single input of an analysis attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    #[default]
    None,
    Document(Document),
    Text(TextInput),
}

impl Payload {
    /// Whether a submission could be built from this payload
    pub fn is_submittable(&self) -> bool {
        match self {
            Payload::None => false,
            Payload::Document(_) => true,
            Payload::Text(text) => !text.is_blank(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Payload::None)
    }
}

/// Size and type checks for candidate documents
pub struct InputValidator;

impl InputValidator {
    /// Validate a candidate document. Never performs I/O.
    pub fn validate(document: &Document) -> Result<(), ValidationError> {
        Self::check_declared(document.declared_size, &document.declared_mime_type)
    }

    /// Validate declared size and MIME type. Size is checked first.
    pub fn check_declared(size: u64, mime_type: &str) -> Result<(), ValidationError> {
        if size > MAX_DOCUMENT_SIZE {
            tracing::debug!("[Validator] Rejected document: {} bytes", size);
            return Err(ValidationError::TooLarge {
                size,
                limit: MAX_DOCUMENT_SIZE,
            });
        }

        if !Self::is_allowed_type(mime_type) {
            tracing::debug!("[Validator] Rejected document type: {}", mime_type);
            return Err(ValidationError::UnsupportedType(mime_type.to_string()));
        }

        Ok(())
    }

    pub fn is_allowed_type(mime_type: &str) -> bool {
        let normalized = normalize_mime(mime_type);
        ALLOWED_MIME_TYPES.contains(&normalized.as_str())
    }
}

/// Lowercase essence of a MIME type, without parameters.
///
/// RTF is registered under several names; all map to `text/rtf`.
fn normalize_mime(mime_type: &str) -> String {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "application/rtf" | "application/x-rtf" | "text/richtext" => "text/rtf".to_string(),
        _ => essence,
    }
}

/// Human-readable file size ("0 Bytes", "1.5 KB", "2 MB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(size: u64, mime: &str) -> Document {
        Document {
            bytes: Vec::new(),
            declared_size: size,
            declared_mime_type: mime.to_string(),
            display_name: "lease".to_string(),
        }
    }

    #[test]
    fn test_accepts_allowed_types() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(InputValidator::validate(&doc(1024, mime)).is_ok(), "{}", mime);
        }
    }

    #[test]
    fn test_too_large_regardless_of_type() {
        for mime in ["application/pdf", "text/plain", "image/png", "video/mp4"] {
            let err = InputValidator::validate(&doc(MAX_DOCUMENT_SIZE + 1, mime)).unwrap_err();
            assert!(matches!(err, ValidationError::TooLarge { .. }), "{}", mime);
        }
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(InputValidator::validate(&doc(MAX_DOCUMENT_SIZE, "application/pdf")).is_ok());
    }

    #[test]
    fn test_unsupported_type_regardless_of_size() {
        for size in [0, 1, 5 * 1024 * 1024, MAX_DOCUMENT_SIZE] {
            let err = InputValidator::validate(&doc(size, "application/zip")).unwrap_err();
            assert_eq!(err, ValidationError::UnsupportedType("application/zip".into()));
        }
    }

    #[test]
    fn test_mime_parameters_are_ignored() {
        assert!(InputValidator::is_allowed_type("text/plain; charset=utf-8"));
        assert!(InputValidator::is_allowed_type("Application/PDF"));
        assert!(!InputValidator::is_allowed_type(""));
    }

    #[test]
    fn test_payload_submittable() {
        assert!(!Payload::None.is_submittable());
        assert!(!Payload::Text(TextInput::new("   \n\t")).is_submittable());
        assert!(Payload::Text(TextInput::new(" lease ")).is_submittable());
        assert!(Payload::Document(doc(10, "application/pdf")).is_submittable());
    }

    #[test]
    fn test_text_stats() {
        let text = TextInput::new("  RESIDENTIAL LEASE\nAGREEMENT  ");
        assert_eq!(text.word_count(), 3);
        assert_eq!(text.char_count(), 31);
        assert_eq!(TextInput::new("   ").word_count(), 0);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
    }

    #[test]
    fn test_document_kind() {
        assert_eq!(DocumentKind::from_mime("application/pdf"), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::from_mime(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            DocumentKind::Word
        );
        assert_eq!(DocumentKind::from_mime("text/rtf"), DocumentKind::Rtf);
        assert_eq!(DocumentKind::from_mime("image/png"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_mime("text/plain"), DocumentKind::Text);
    }

    #[tokio::test]
    async fn test_load_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lease.txt");
        std::fs::write(&path, "Rent is due on the first.").unwrap();

        let document = Document::load(&path).await.unwrap();
        assert_eq!(document.display_name, "lease.txt");
        assert_eq!(document.declared_mime_type, "text/plain");
        assert_eq!(document.declared_size, 25);
        assert_eq!(document.kind(), DocumentKind::Text);
    }

    #[tokio::test]
    async fn test_load_office_and_rtf_documents() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("lease.rtf", DocumentKind::Rtf),
            ("lease.doc", DocumentKind::Word),
            ("lease.docx", DocumentKind::Word),
        ];

        for (name, kind) in cases {
            let path = dir.path().join(name);
            std::fs::write(&path, b"{\\rtf1 Rent is due monthly.}").unwrap();

            let document = Document::load(&path)
                .await
                .unwrap_or_else(|e| panic!("{} rejected: {:?}", name, e));
            assert_eq!(document.kind(), kind, "{}", name);
            assert!(InputValidator::validate(&document).is_ok());
        }
    }

    #[test]
    fn test_rtf_aliases_accepted() {
        for mime in ["application/rtf", "application/x-rtf", "text/rtf", "TEXT/RTF; charset=utf-8"] {
            assert!(InputValidator::is_allowed_type(mime), "{}", mime);
            assert_eq!(DocumentKind::from_mime(mime), DocumentKind::Rtf);
        }
    }

    #[tokio::test]
    async fn test_load_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lease.zip");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let err = Document::load(&path).await.unwrap_err();
        assert!(matches!(
            err,
            DocumentLoadError::Invalid(ValidationError::UnsupportedType(_))
        ));
    }
}
