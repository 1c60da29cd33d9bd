//! Ordered attachment merge.

use serde::Serialize;

use billpack_attachments::{AttachmentDescriptor, AttachmentKind};
use billpack_core::{AttachmentId, RequestId};

use crate::config::MergeConfig;
use crate::error::SkipReason;
use crate::pdf::{self, Assembly, PdfPart};
use crate::raster;

/// Content type of everything this pipeline produces.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A rendered report as handed over by the document engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl RenderedDocument {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self::new(bytes, PDF_CONTENT_TYPE)
    }
}

/// One unit of work: a base document and the attachments to append, in order.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub base_document: Vec<u8>,
    pub attachments: Vec<AttachmentDescriptor>,
}

/// How a merge ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// At least one attachment was appended.
    Merged,
    /// Nothing to append; the base came back as-is.
    Unchanged,
    /// Document merge is switched off; the base came back as-is.
    CapabilityUnavailable,
    /// Final assembly failed; the base came back as-is.
    AssemblyFailed,
}

/// An attachment that contributed no pages, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAttachment {
    pub id: AttachmentId,
    pub name: String,
    pub reason: SkipReason,
}

/// Merged bytes plus an audit trail of what went in.
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub bytes: Vec<u8>,
    pub outcome: MergeOutcome,
    /// Attachments whose pages are in `bytes`, in page order.
    pub merged: Vec<AttachmentId>,
    pub skipped: Vec<SkippedAttachment>,
}

impl MergeReport {
    fn unchanged(base: &[u8], outcome: MergeOutcome) -> Self {
        Self {
            bytes: base.to_vec(),
            outcome,
            merged: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// The report without the document bytes.
    pub fn summary(&self) -> MergeSummary {
        MergeSummary {
            outcome: self.outcome,
            merged: self.merged.clone(),
            skipped: self.skipped.clone(),
            output_len: self.bytes.len(),
        }
    }
}

/// Serializable view of a [`MergeReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub outcome: MergeOutcome,
    pub merged: Vec<AttachmentId>,
    pub skipped: Vec<SkippedAttachment>,
    pub output_len: usize,
}

/// Appends attachments to a rendered PDF.
///
/// Stateless apart from its configuration; one instance can serve every
/// request of the process.
#[derive(Debug, Clone, Default)]
pub struct MergePipeline {
    config: MergeConfig,
}

impl MergePipeline {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    /// Pipeline using the process-wide capabilities.
    pub fn from_env() -> Self {
        Self::new(MergeConfig::from_env())
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// `base` followed by every usable attachment, in the given order.
    ///
    /// Never fails: at worst the result is `base` unchanged.
    pub fn merge(&self, base: &[u8], ordered: &[AttachmentDescriptor]) -> Vec<u8> {
        self.merge_with_report(base, ordered).bytes
    }

    pub fn merge_request(&self, request: &MergeRequest) -> Vec<u8> {
        self.merge(&request.base_document, &request.attachments)
    }

    /// Merge into a rendered document; the content type passes through.
    pub fn merge_rendered(
        &self,
        document: RenderedDocument,
        ordered: &[AttachmentDescriptor],
    ) -> RenderedDocument {
        let report = self.merge_with_report(&document.bytes, ordered);
        match report.outcome {
            MergeOutcome::Merged => RenderedDocument {
                bytes: report.bytes,
                content_type: document.content_type,
            },
            _ => document,
        }
    }

    /// Same as [`merge`](Self::merge) but reports what happened to every
    /// attachment.
    pub fn merge_with_report(&self, base: &[u8], ordered: &[AttachmentDescriptor]) -> MergeReport {
        let request_id = RequestId::new();
        let span = tracing::info_span!(
            "attachment_merge",
            request_id = %request_id,
            attachments = ordered.len()
        );
        let _guard = span.enter();

        if !self.config.capabilities.document_merge {
            tracing::warn!("PDF merge unavailable; returning base document without attachments");
            return MergeReport::unchanged(base, MergeOutcome::CapabilityUnavailable);
        }

        if ordered.is_empty() {
            return MergeReport::unchanged(base, MergeOutcome::Unchanged);
        }

        let mut assembly = Assembly::seeded(base);
        let mut merged = Vec::new();
        let mut skipped = Vec::new();

        for attachment in ordered {
            match self.prepare(attachment) {
                Ok(part) => {
                    tracing::debug!(
                        attachment_id = %attachment.id,
                        attachment = %attachment.name,
                        pages = part.page_count(),
                        "attachment appended"
                    );
                    assembly.push(part);
                    merged.push(attachment.id);
                }
                Err(reason) => {
                    log_skip(attachment, &reason);
                    skipped.push(SkippedAttachment {
                        id: attachment.id,
                        name: attachment.name.clone(),
                        reason,
                    });
                }
            }
        }

        if assembly.appended() == 0 {
            return MergeReport {
                bytes: base.to_vec(),
                outcome: MergeOutcome::Unchanged,
                merged,
                skipped,
            };
        }

        match assembly.finish() {
            Ok(bytes) => {
                tracing::info!(
                    merged = merged.len(),
                    skipped = skipped.len(),
                    "attachments merged"
                );
                MergeReport {
                    bytes,
                    outcome: MergeOutcome::Merged,
                    merged,
                    skipped,
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to assemble merged PDF; returning base document");
                MergeReport {
                    bytes: base.to_vec(),
                    outcome: MergeOutcome::AssemblyFailed,
                    merged: Vec::new(),
                    skipped,
                }
            }
        }
    }

    /// Turn one attachment into pages, or say why it has none.
    fn prepare(&self, attachment: &AttachmentDescriptor) -> Result<PdfPart, SkipReason> {
        let payload = attachment.payload().ok_or(SkipReason::MissingPayload)?;

        match attachment.kind() {
            AttachmentKind::Document => Ok(pdf::decode(payload)?),
            AttachmentKind::Image => {
                if !self.config.capabilities.image_to_document {
                    return Err(SkipReason::ImageConversionUnavailable);
                }
                Ok(raster::normalize_to_part(payload, &self.config.image)?)
            }
            AttachmentKind::Other => Err(SkipReason::UnsupportedType),
        }
    }
}

fn log_skip(attachment: &AttachmentDescriptor, reason: &SkipReason) {
    if reason.is_failure() {
        tracing::warn!(
            attachment_id = %attachment.id,
            attachment = %attachment.name,
            error = %reason,
            "skipping attachment"
        );
    } else {
        tracing::trace!(
            attachment_id = %attachment.id,
            attachment = %attachment.name,
            reason = %reason,
            "attachment not mergeable"
        );
    }
}
