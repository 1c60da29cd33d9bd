//! Content-type classification.

use serde::{Deserialize, Serialize};

/// Canonical PDF media type.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// How the merge pipeline treats an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Already a PDF; appended page for page.
    Document,
    /// Raster image; converted to a one-page PDF first.
    Image,
    /// Anything else. Listed to the user, never merged.
    Other,
}

impl AttachmentKind {
    /// Classify by declared MIME type only; payload bytes are never sniffed.
    ///
    /// `None` and the empty string are `Other`.
    pub fn classify(mime_type: Option<&str>) -> Self {
        match mime_type {
            Some(PDF_MIME_TYPE) => AttachmentKind::Document,
            Some(mime) if mime.starts_with("image/") => AttachmentKind::Image,
            _ => AttachmentKind::Other,
        }
    }
}
