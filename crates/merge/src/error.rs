//! Merge error taxonomy.
//!
//! None of these cross the pipeline boundary: per-attachment errors become
//! [`SkipReason`]s, assembly errors make the pipeline return the base document.

use serde::Serialize;
use thiserror::Error;

/// A PDF payload could not be used.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PdfError {
    #[error("unreadable PDF: {0}")]
    Parse(String),

    #[error("PDF is encrypted")]
    Encrypted,

    #[error("PDF has no pages")]
    NoPages,
}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::Parse(err.to_string())
    }
}

/// Image normalization failed.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ImageError {
    /// Corrupt bytes or unsupported codec.
    #[error("cannot decode image: {0}")]
    Decode(String),

    /// The flattened raster could not be written as a PDF page.
    #[error("cannot encode image page: {0}")]
    Encode(String),
}

/// Why an attachment contributed no pages.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("attachment has no content")]
    MissingPayload,

    #[error("content type is not mergeable")]
    UnsupportedType,

    #[error("image conversion unavailable")]
    ImageConversionUnavailable,

    #[error(transparent)]
    DocumentDecode(#[from] PdfError),

    #[error(transparent)]
    ImageNormalization(#[from] ImageError),
}

impl SkipReason {
    /// Whether the skip points at bad input worth a warning, as opposed to an
    /// expected omission.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SkipReason::DocumentDecode(_) | SkipReason::ImageNormalization(_)
        )
    }
}

/// The final concatenation failed; the caller falls back to the base document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("base document unusable: {0}")]
    BaseDocument(PdfError),

    #[error("page {page_id:?} is not a dictionary")]
    MalformedPage { page_id: (u32, u16) },

    #[error("merged document has no pages")]
    NoPages,

    #[error("failed to write merged document: {0}")]
    Write(String),
}
