//! Report data and wizards for the billing reports.
//!
//! - Delivered invoices: customer invoices per partner and shipment, with
//!   editable delivery addresses.
//! - Expense settlement: invoices per issuing company with GTQ/USD totals,
//!   plus the supporting attachments appended to the printed PDF.
//!
//! The host renders the templates; this crate prepares their data and
//! post-processes the settlement PDF.

pub mod delivered;
pub mod error;
pub mod external;
pub mod print;
pub mod records;
pub mod settlement;
pub mod wizard;

pub use delivered::{
    DeliveredInvoicesReport, NO_SHIPMENT_LABEL, PartnerSection, PartnerTotals, ShipmentGroup,
};
pub use error::{ReportError, ReportResult};
pub use external::{ExternalAccountLine, RelatedExpense, related_expense};
pub use print::{
    DELIVERED_REPORT_NAME, PrintRequest, ReportType, SETTLEMENT_REPORT_NAME, render_settlement,
};
pub use records::{
    CompanyRef, InvoiceRecord, MoveType, PartnerRef, PostalAddress, ShipmentRef, customer_invoices,
};
pub use settlement::{CompanySection, GrandTotals, SettlementReport, available_attachments};
pub use wizard::{
    ActiveContext, AttachmentLine, DeliveredInvoicesWizard, DeliveredLine, SettlementWizard,
    SettlementWizards,
};
