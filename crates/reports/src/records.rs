//! Host records the reports are built from.
//!
//! The host resolves every relation before handing a record over; these types
//! are plain data with no lazy lookups.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billpack_core::{
    CompanyId, CurrencyCode, DomainError, DomainResult, Entity, InvoiceId, Money, PartnerId,
    ShipmentId,
};

/// Shown when an operator opens a wizard from anything but an invoice list.
pub const SELECT_INVOICES_MESSAGE: &str = "select at least one invoice";

/// Shown when a selection holds no customer invoices.
pub const SELECT_CUSTOMER_INVOICES_MESSAGE: &str = "select customer invoices";

/// Accounting move type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    OutInvoice,
    OutRefund,
    InInvoice,
    InRefund,
    Entry,
}

impl MoveType {
    /// Customer invoices and customer credit notes.
    pub fn is_customer(self) -> bool {
        matches!(self, MoveType::OutInvoice | MoveType::OutRefund)
    }
}

/// Postal address parts as stored on the partner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl PostalAddress {
    /// Single-line address: non-empty parts joined by `", "`.
    pub fn format(&self) -> String {
        [
            &self.street,
            &self.street2,
            &self.city,
            &self.state,
            &self.zip,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerRef {
    pub id: PartnerId,
    pub name: String,
    #[serde(default)]
    pub address: PostalAddress,
}

impl PartnerRef {
    pub fn new(id: PartnerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: PostalAddress::default(),
        }
    }

    pub fn with_address(mut self, address: PostalAddress) -> Self {
        self.address = address;
        self
    }
}

/// Issuing company, with the bank accounts printed under its totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub id: CompanyId,
    pub name: String,
    pub bank_account_gtq: Option<String>,
    pub bank_account_usd: Option<String>,
}

impl CompanyRef {
    pub fn new(id: CompanyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bank_account_gtq: None,
            bank_account_usd: None,
        }
    }

    pub fn with_bank_accounts(mut self, gtq: Option<String>, usd: Option<String>) -> Self {
        self.bank_account_gtq = gtq;
        self.bank_account_usd = usd;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRef {
    pub id: ShipmentId,
    pub name: String,
}

impl ShipmentRef {
    pub fn new(id: ShipmentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// An accounting move as the reports see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    /// Document number, e.g. `INV/2024/0001`.
    pub name: String,
    pub move_type: MoveType,
    pub partner: Option<PartnerRef>,
    pub company: CompanyRef,
    pub shipment: Option<ShipmentRef>,
    pub amount_total: Money,
    pub date_sent: Option<NaiveDate>,
    pub invoice_date: Option<NaiveDate>,
    /// Billed on behalf of a third party ("external account").
    #[serde(default)]
    pub external_account: bool,
}

impl InvoiceRecord {
    pub fn new(
        id: InvoiceId,
        name: impl Into<String>,
        move_type: MoveType,
        company: CompanyRef,
        amount_total: Money,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            move_type,
            partner: None,
            company,
            shipment: None,
            amount_total,
            date_sent: None,
            invoice_date: None,
            external_account: false,
        }
    }

    pub fn with_partner(mut self, partner: PartnerRef) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn with_shipment(mut self, shipment: ShipmentRef) -> Self {
        self.shipment = Some(shipment);
        self
    }

    pub fn with_date_sent(mut self, date: NaiveDate) -> Self {
        self.date_sent = Some(date);
        self
    }

    pub fn with_invoice_date(mut self, date: NaiveDate) -> Self {
        self.invoice_date = Some(date);
        self
    }

    pub fn with_external_account(mut self, external: bool) -> Self {
        self.external_account = external;
        self
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.amount_total.currency
    }

    pub fn is_customer_invoice(&self) -> bool {
        self.move_type.is_customer()
    }
}

impl Entity for InvoiceRecord {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Keep customer invoices and refunds, in input order.
///
/// # Errors
///
/// `DomainError::Validation` when nothing is left.
pub fn customer_invoices(invoices: &[InvoiceRecord]) -> DomainResult<Vec<InvoiceRecord>> {
    let kept: Vec<InvoiceRecord> = invoices
        .iter()
        .filter(|invoice| invoice.is_customer_invoice())
        .cloned()
        .collect();

    if kept.is_empty() {
        return Err(DomainError::validation(SELECT_CUSTOMER_INVOICES_MESSAGE));
    }
    Ok(kept)
}

/// Distinct shipments of `invoices`, first-seen order.
pub fn shipments_of(invoices: &[InvoiceRecord]) -> Vec<ShipmentRef> {
    let mut shipments: Vec<ShipmentRef> = Vec::new();
    for shipment in invoices.iter().filter_map(|invoice| invoice.shipment.as_ref()) {
        if !shipments.iter().any(|known| known.id == shipment.id) {
            shipments.push(shipment.clone());
        }
    }
    shipments
}
