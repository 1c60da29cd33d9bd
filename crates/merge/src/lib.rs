//! Attachment merge pipeline.
//!
//! Appends a request's attachments to an already rendered PDF, in exactly the
//! order the caller chose:
//!
//! - PDFs are appended page for page.
//! - Raster images become one-page PDFs (flattened onto white, capped at
//!   2000 px, 100 DPI).
//! - Anything else is left out.
//!
//! A bad attachment only costs its own pages. If the final assembly fails the
//! caller gets the base document back untouched; report generation never fails
//! because of an attachment.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod raster;

pub use capabilities::Capabilities;
pub use config::{ImageOptions, MergeConfig};
pub use error::{AssemblyError, ImageError, PdfError, SkipReason};
pub use pipeline::{
    MergeOutcome, MergePipeline, MergeReport, MergeRequest, MergeSummary, PDF_CONTENT_TYPE,
    RenderedDocument, SkippedAttachment,
};
pub use raster::normalize_image;
