//! `billpack-core`: shared building blocks for the billing report crates.
//!
//! This crate contains **pure domain** primitives (no host ORM, no rendering).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AttachmentId, CompanyId, InvoiceId, PartnerId, RequestId, ShipmentId, WizardId};
pub use value_object::{CurrencyCode, Money, ValueObject};
