//! "Delivered invoices" report: customer invoices grouped by partner, then by
//! shipment, with a delivery address per partner.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use billpack_core::{DomainResult, PartnerId, ShipmentId};

use crate::records::{InvoiceRecord, PartnerRef, ShipmentRef, customer_invoices};

/// Group heading for invoices not billed against a shipment.
pub const NO_SHIPMENT_LABEL: &str = "No shipment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipmentGroup {
    pub shipment: Option<ShipmentRef>,
    pub shipment_name: String,
    pub invoices: Vec<InvoiceRecord>,
}

/// Per-partner totals, in the smallest currency unit.
///
/// Amounts are added as stored, whatever their currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartnerTotals {
    pub total: i64,
    pub external_account: i64,
    /// Fees are not billed through this report; always zero.
    pub fees: i64,
}

impl PartnerTotals {
    fn of(invoices: &[InvoiceRecord]) -> Self {
        let sum = |filter: fn(&InvoiceRecord) -> bool| {
            invoices
                .iter()
                .filter(|invoice| filter(invoice))
                .fold(0i64, |acc, invoice| acc.saturating_add(invoice.amount_total.amount))
        };
        Self {
            total: sum(|_| true),
            external_account: sum(|invoice| invoice.external_account),
            fees: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerSection {
    pub partner: PartnerRef,
    /// Custom delivery address if one was entered, else the partner's own.
    pub address: String,
    pub groups: Vec<ShipmentGroup>,
    pub totals: PartnerTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveredInvoicesReport {
    pub invoices: Vec<InvoiceRecord>,
    pub partners: Vec<PartnerSection>,
}

impl DeliveredInvoicesReport {
    /// Build the report data.
    ///
    /// `today` stands in for a missing send date when ordering invoices.
    /// Invoices without a partner are listed in `invoices` but appear in no
    /// partner section.
    ///
    /// # Errors
    ///
    /// Validation error when `invoices` holds no customer invoice.
    pub fn build(
        invoices: &[InvoiceRecord],
        custom_addresses: &BTreeMap<PartnerId, String>,
        today: NaiveDate,
    ) -> DomainResult<Self> {
        let invoices = customer_invoices(invoices)?;

        let mut partners: Vec<&PartnerRef> = Vec::new();
        for partner in invoices.iter().filter_map(|invoice| invoice.partner.as_ref()) {
            if !partners.iter().any(|known| known.id == partner.id) {
                partners.push(partner);
            }
        }
        partners.sort_by(|a, b| a.name.cmp(&b.name));

        let sections = partners
            .into_iter()
            .map(|partner| {
                let own: Vec<InvoiceRecord> = invoices
                    .iter()
                    .filter(|invoice| invoice.partner.as_ref().map(|p| p.id) == Some(partner.id))
                    .cloned()
                    .collect();

                let address = custom_addresses
                    .get(&partner.id)
                    .cloned()
                    .unwrap_or_else(|| partner.address.format());

                PartnerSection {
                    partner: partner.clone(),
                    address,
                    totals: PartnerTotals::of(&own),
                    groups: group_by_shipment(own, today),
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            invoices = invoices.len(),
            partners = sections.len(),
            "delivered invoices report built"
        );

        Ok(Self {
            invoices,
            partners: sections,
        })
    }
}

/// Sort by (shipment name, send date, number), then group by shipment in
/// first-seen order.
fn group_by_shipment(mut invoices: Vec<InvoiceRecord>, today: NaiveDate) -> Vec<ShipmentGroup> {
    invoices.sort_by(|a, b| {
        let key = |invoice: &InvoiceRecord| {
            (
                invoice.shipment.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
                invoice.date_sent.unwrap_or(today),
                invoice.name.clone(),
            )
        };
        key(a).cmp(&key(b))
    });

    let mut groups: Vec<(Option<ShipmentId>, ShipmentGroup)> = Vec::new();
    for invoice in invoices {
        let key = invoice.shipment.as_ref().map(|s| s.id);
        match groups.iter_mut().find(|(known, _)| *known == key) {
            Some((_, group)) => group.invoices.push(invoice),
            None => groups.push((
                key,
                ShipmentGroup {
                    shipment: invoice.shipment.clone(),
                    shipment_name: invoice
                        .shipment
                        .as_ref()
                        .map(|s| s.name.clone())
                        .unwrap_or_else(|| NO_SHIPMENT_LABEL.to_string()),
                    invoices: vec![invoice],
                },
            )),
        }
    }

    groups.into_iter().map(|(_, group)| group).collect()
}
