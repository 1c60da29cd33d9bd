//! Third-party ("external account") expense lines linked to invoices.

use serde::{Deserialize, Serialize};

use billpack_core::InvoiceId;

/// An external account line: an expense paid on a customer's behalf and the
/// invoice (move) it was re-billed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAccountLine {
    pub move_id: InvoiceId,
    pub expense_id: Option<InvoiceId>,
    pub invoice_series: Option<String>,
    pub invoice_number: Option<String>,
}

/// The vendor expense behind an invoice, as printed next to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelatedExpense {
    pub expense_id: Option<InvoiceId>,
    pub series: String,
    pub number: String,
}

/// Expense re-billed on `move_id`, from the first matching line.
///
/// Empty when the invoice is not on any external account line.
pub fn related_expense(move_id: InvoiceId, lines: &[ExternalAccountLine]) -> RelatedExpense {
    lines
        .iter()
        .find(|line| line.move_id == move_id)
        .map(|line| RelatedExpense {
            expense_id: line.expense_id,
            series: line.invoice_series.clone().unwrap_or_default(),
            number: line.invoice_number.clone().unwrap_or_default(),
        })
        .unwrap_or_default()
}
