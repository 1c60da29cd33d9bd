//! Attachment lookup seam towards the host.

use std::sync::RwLock;

use thiserror::Error;

use billpack_core::{AttachmentId, InvoiceId, ShipmentId};

use crate::descriptor::{AttachmentDescriptor, AttachmentSummary};

/// Record an attachment hangs off.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttachmentOwner {
    Invoice(InvoiceId),
    Shipment(ShipmentId),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("attachment store lock poisoned")]
    Poisoned,

    #[error("attachment backend failure: {0}")]
    Backend(String),
}

/// Read access to the host's attachment records.
pub trait AttachmentStore {
    /// Attachments of the given owners, in owner order and then in the order
    /// the host stored them.
    fn list(&self, owners: &[AttachmentOwner]) -> Result<Vec<AttachmentSummary>, StoreError>;

    /// Fully resolved attachment (payload included), or `None` if unknown.
    fn fetch(&self, id: AttachmentId) -> Result<Option<AttachmentDescriptor>, StoreError>;

    /// Resolve `ids` in the given order, dropping unknown ids.
    fn fetch_ordered(&self, ids: &[AttachmentId]) -> Result<Vec<AttachmentDescriptor>, StoreError> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match self.fetch(*id)? {
                Some(descriptor) => out.push(descriptor),
                None => tracing::debug!(attachment_id = %id, "unknown attachment id dropped"),
            }
        }
        Ok(out)
    }
}

/// In-memory attachment store.
///
/// Intended for tests/dev and the CLI. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryAttachmentStore {
    records: RwLock<Vec<(AttachmentOwner, AttachmentDescriptor)>>,
}

impl InMemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, owner: AttachmentOwner, descriptor: AttachmentDescriptor) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        records.push((owner, descriptor));
        Ok(())
    }
}

impl AttachmentStore for InMemoryAttachmentStore {
    fn list(&self, owners: &[AttachmentOwner]) -> Result<Vec<AttachmentSummary>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let mut out = Vec::new();
        for owner in owners {
            out.extend(
                records
                    .iter()
                    .filter(|(o, _)| o == owner)
                    .map(|(_, descriptor)| descriptor.summary()),
            );
        }
        Ok(out)
    }

    fn fetch(&self, id: AttachmentId) -> Result<Option<AttachmentDescriptor>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records
            .iter()
            .find(|(_, descriptor)| descriptor.id == id)
            .map(|(_, descriptor)| descriptor.clone()))
    }
}
