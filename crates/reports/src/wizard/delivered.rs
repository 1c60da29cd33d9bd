use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use billpack_core::{DomainError, DomainResult, InvoiceId, PartnerId, WizardId};

use crate::delivered::DeliveredInvoicesReport;
use crate::records::{InvoiceRecord, PartnerRef};

use super::ActiveContext;

/// One customer of the selection, with an editable delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveredLine {
    pub partner: PartnerRef,
    pub invoice_ids: Vec<InvoiceId>,
    pub invoice_count: usize,
    /// Sum of the partner's invoice totals, smallest currency unit.
    pub total_amount: i64,
    pub address: String,
}

/// Delivery-address editor for the delivered invoices report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveredInvoicesWizard {
    pub id: WizardId,
    invoices: Vec<InvoiceRecord>,
    lines: Vec<DeliveredLine>,
}

impl DeliveredInvoicesWizard {
    /// One line per partner, first-seen order, address prefilled from the
    /// partner record.
    pub fn open(id: WizardId, context: &ActiveContext, records: &[InvoiceRecord]) -> DomainResult<Self> {
        let invoices = context.customer_selection(records)?;

        let mut lines: Vec<DeliveredLine> = Vec::new();
        for invoice in &invoices {
            let Some(partner) = &invoice.partner else {
                continue;
            };
            match lines.iter_mut().find(|line| line.partner.id == partner.id) {
                Some(line) => {
                    line.invoice_ids.push(invoice.id);
                    line.invoice_count += 1;
                    line.total_amount = line.total_amount.saturating_add(invoice.amount_total.amount);
                }
                None => lines.push(DeliveredLine {
                    partner: partner.clone(),
                    invoice_ids: vec![invoice.id],
                    invoice_count: 1,
                    total_amount: invoice.amount_total.amount,
                    address: partner.address.format(),
                }),
            }
        }

        tracing::debug!(
            wizard_id = %id,
            invoices = invoices.len(),
            partners = lines.len(),
            "delivered invoices wizard opened"
        );

        Ok(Self { id, invoices, lines })
    }

    pub fn invoices(&self) -> &[InvoiceRecord] {
        &self.invoices
    }

    pub fn lines(&self) -> &[DeliveredLine] {
        &self.lines
    }

    pub fn set_address(&mut self, partner: PartnerId, address: impl Into<String>) -> DomainResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.partner.id == partner)
            .ok_or_else(|| DomainError::not_found(format!("partner {partner} is not in this wizard")))?;
        line.address = address.into();
        Ok(())
    }

    /// Delivery address per partner, as currently edited.
    pub fn custom_addresses(&self) -> BTreeMap<PartnerId, String> {
        self.lines
            .iter()
            .map(|line| (line.partner.id, line.address.clone()))
            .collect()
    }

    /// Report data for the wizard's invoices and addresses.
    pub fn report(&self, today: NaiveDate) -> DomainResult<DeliveredInvoicesReport> {
        DeliveredInvoicesReport::build(&self.invoices, &self.custom_addresses(), today)
    }
}
