//! Selection wizards opened from the host's invoice list.

mod delivered;
mod settlement;

pub use delivered::{DeliveredInvoicesWizard, DeliveredLine};
pub use settlement::{AttachmentLine, SettlementWizard};

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use billpack_core::{DomainError, DomainResult, InvoiceId, WizardId};

use crate::records::{InvoiceRecord, SELECT_INVOICES_MESSAGE, customer_invoices};

/// Host model name of accounting moves.
pub const INVOICE_MODEL: &str = "account.move";

/// What the host UI had selected when the wizard was launched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveContext {
    pub active_model: Option<String>,
    #[serde(default)]
    pub active_ids: Vec<InvoiceId>,
}

impl ActiveContext {
    pub fn invoices(ids: impl IntoIterator<Item = InvoiceId>) -> Self {
        Self {
            active_model: Some(INVOICE_MODEL.to_string()),
            active_ids: ids.into_iter().collect(),
        }
    }

    /// Customer invoices among the selected records, in selection order.
    ///
    /// `records` is whatever the host resolved for `active_ids`; ids it could
    /// not resolve are ignored.
    pub fn customer_selection(&self, records: &[InvoiceRecord]) -> DomainResult<Vec<InvoiceRecord>> {
        if self.active_model.as_deref() != Some(INVOICE_MODEL) || self.active_ids.is_empty() {
            return Err(DomainError::validation(SELECT_INVOICES_MESSAGE));
        }

        let selected: Vec<InvoiceRecord> = self
            .active_ids
            .iter()
            .filter_map(|id| records.iter().find(|record| record.id == *id))
            .cloned()
            .collect();
        customer_invoices(&selected)
    }
}

/// Lookup of open settlement wizards by id.
pub trait SettlementWizards {
    fn settlement_wizard(&self, id: WizardId) -> Option<&SettlementWizard>;
}

impl SettlementWizards for BTreeMap<WizardId, SettlementWizard> {
    fn settlement_wizard(&self, id: WizardId) -> Option<&SettlementWizard> {
        self.get(&id)
    }
}

impl SettlementWizards for HashMap<WizardId, SettlementWizard> {
    fn settlement_wizard(&self, id: WizardId) -> Option<&SettlementWizard> {
        self.get(&id)
    }
}
