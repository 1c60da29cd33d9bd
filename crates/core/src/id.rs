//! Strongly-typed identifiers used across the report crates.
//!
//! Host records are addressed by integer database ids; a merge request is
//! additionally tagged with a time-ordered [`RequestId`] for log correlation.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of an attachment record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(u64);

/// Identifier of an accounting move (invoice, refund...).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(u64);

/// Identifier of a business partner (customer).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(u64);

/// Identifier of an issuing company.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(u64);

/// Identifier of a shipment the invoices are billed against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentId(u64);

/// Identifier of a transient selection wizard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WizardId(u64);

/// Identifier of a single report-generation request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

macro_rules! impl_record_id {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(raw))
            }
        }
    };
}

impl_record_id!(AttachmentId, "AttachmentId");
impl_record_id!(InvoiceId, "InvoiceId");
impl_record_id!(PartnerId, "PartnerId");
impl_record_id!(CompanyId, "CompanyId");
impl_record_id!(ShipmentId, "ShipmentId");
impl_record_id!(WizardId, "WizardId");

impl RequestId {
    /// Create a new request identifier.
    ///
    /// Uses UUIDv7 (time-ordered) so log lines sort by request start.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_parse_from_decimal_strings() {
        let id: AttachmentId = " 42 ".parse().unwrap();
        assert_eq!(id, AttachmentId::new(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn invalid_record_id_names_the_type() {
        let err = "abc".parse::<InvoiceId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) if msg.starts_with("InvoiceId") => {}
            other => panic!("Expected InvalidId for InvoiceId, got {other:?}"),
        }
    }

    #[test]
    fn record_ids_serialize_transparently() {
        let json = serde_json::to_string(&ShipmentId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
