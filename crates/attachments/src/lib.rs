//! Attachment records as they cross from the host into the report pipeline.
//!
//! The host resolves every record before handing it over: a descriptor either
//! carries its payload or explicitly carries none. Nothing here talks to a
//! database.

pub mod descriptor;
pub mod kind;
pub mod partition;
pub mod store;

pub use descriptor::{AttachmentDescriptor, AttachmentSummary};
pub use kind::{AttachmentKind, PDF_MIME_TYPE};
pub use partition::AttachmentPartition;
pub use store::{AttachmentOwner, AttachmentStore, InMemoryAttachmentStore, StoreError};
