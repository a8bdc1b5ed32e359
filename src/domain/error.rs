// ============================================================
// Layer 3 - Domain Errors
// ============================================================
// Typed errors that callers inspect rather than just print:
//
//   UploadRejection     - one uploaded image was skipped.
//                         Collected per item; never aborts a batch.
//   IncompleteInputError - required form fields were left blank.
//   InvalidInputError    - a form field had an unusable value.
//   FormError            - either of the two above, returned by
//                          the form adapter's `collect`.
//
// The model-file error lives next to the loader in the infra
// layer because it wraps I/O and JSON errors.
//
// Reference: thiserror crate documentation

use thiserror::Error;

use crate::domain::features::FeatureField;

/// Why one uploaded image was not added to the slideshow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("unsupported media type '{0}' (only PNG and JPEG images are accepted)")]
    UnsupportedMedia(String),

    #[error("content is not a valid {expected} image")]
    Malformed { expected: &'static str },

    #[error("file is {size} bytes, over the {limit} byte limit")]
    Oversized { size: usize, limit: usize },

    #[error("only the first {limit} images of an upload are used")]
    TooMany { limit: usize },
}

/// A single skipped upload, reported back to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("skipped '{file_name}': {reason}")]
pub struct UploadRejection {
    pub file_name: String,
    pub reason:    RejectReason,
}

impl UploadRejection {
    pub fn new(file_name: impl Into<String>, reason: RejectReason) -> Self {
        Self { file_name: file_name.into(), reason }
    }

    #[cfg(test)]
    pub fn is_unsupported_media(&self) -> bool {
        matches!(self.reason, RejectReason::UnsupportedMedia(_))
    }
}

/// Required fields missing from a submission, in form order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", join_names(.missing))]
pub struct IncompleteInputError {
    pub missing: Vec<FeatureField>,
}

/// A present field whose value could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} = '{value}': expected {expected}")]
pub struct InvalidInputError {
    pub field:    FeatureField,
    pub value:    String,
    pub expected: String,
}

/// Everything that can stop a form submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Incomplete(#[from] IncompleteInputError),

    #[error("invalid fields: {}", join_invalid(.0))]
    Invalid(Vec<InvalidInputError>),
}

impl FormError {
    /// Every field the user needs to fix, for inline highlighting
    pub fn fields(&self) -> Vec<FeatureField> {
        match self {
            Self::Incomplete(e) => e.missing.clone(),
            Self::Invalid(errs) => errs.iter().map(|e| e.field).collect(),
        }
    }
}

fn join_names(fields: &[FeatureField]) -> String {
    fields
        .iter()
        .map(FeatureField::name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_invalid(errors: &[InvalidInputError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
