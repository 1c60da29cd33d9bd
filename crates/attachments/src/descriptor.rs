//! Attachment descriptor and its payload-free summary.

use serde::{Deserialize, Serialize};

use billpack_core::{AttachmentId, Entity};

use crate::kind::AttachmentKind;

/// A host attachment resolved for one request.
///
/// Immutable from the pipeline's point of view. `payload` is `None` when the
/// record exists but has no stored content; such descriptors are skipped.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    pub id: AttachmentId,
    /// Display name, used only in diagnostics.
    pub name: String,
    pub mime_type: Option<String>,
    pub payload: Option<Vec<u8>>,
}

impl AttachmentDescriptor {
    pub fn new(id: AttachmentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            mime_type: None,
            payload: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::classify(self.mime_type.as_deref())
    }

    /// Payload bytes, treating an empty payload like a missing one.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref().filter(|bytes| !bytes.is_empty())
    }

    pub fn summary(&self) -> AttachmentSummary {
        AttachmentSummary {
            id: self.id,
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            kind: self.kind(),
        }
    }
}

// Payloads can be megabytes; keep them out of debug output.
impl core::fmt::Debug for AttachmentDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttachmentDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("payload_len", &self.payload.as_ref().map(Vec::len))
            .finish()
    }
}

impl Entity for AttachmentDescriptor {
    type Id = AttachmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload-free view of an attachment, for listings and report templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSummary {
    pub id: AttachmentId,
    pub name: String,
    pub mime_type: Option<String>,
    pub kind: AttachmentKind,
}

impl Entity for AttachmentSummary {
    type Id = AttachmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
