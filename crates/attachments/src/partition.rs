//! Order-preserving split of an attachment list by kind.

use serde::{Deserialize, Serialize};

use crate::descriptor::{AttachmentDescriptor, AttachmentSummary};
use crate::kind::AttachmentKind;

/// Attachments grouped for the settlement report template.
///
/// Each group keeps the relative order of the input list; `all` is the input
/// list itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPartition {
    pub images: Vec<AttachmentSummary>,
    pub pdfs: Vec<AttachmentSummary>,
    pub others: Vec<AttachmentSummary>,
    pub all: Vec<AttachmentSummary>,
    /// Whether the merge step can run at all in this process.
    pub has_merge: bool,
}

impl AttachmentPartition {
    pub fn from_summaries(summaries: &[AttachmentSummary], has_merge: bool) -> Self {
        let mut partition = AttachmentPartition {
            has_merge,
            ..Default::default()
        };
        for summary in summaries {
            match summary.kind {
                AttachmentKind::Image => partition.images.push(summary.clone()),
                AttachmentKind::Document => partition.pdfs.push(summary.clone()),
                AttachmentKind::Other => partition.others.push(summary.clone()),
            }
            partition.all.push(summary.clone());
        }
        partition
    }

    pub fn from_ordered(attachments: &[AttachmentDescriptor], has_merge: bool) -> Self {
        let summaries: Vec<AttachmentSummary> =
            attachments.iter().map(AttachmentDescriptor::summary).collect();
        Self::from_summaries(&summaries, has_merge)
    }
}
