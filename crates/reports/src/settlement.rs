//! "Expense settlement" report: customer invoices per issuing company with
//! per-currency totals and the supporting attachments.

use chrono::NaiveDate;
use serde::Serialize;

use billpack_attachments::{
    AttachmentOwner, AttachmentPartition, AttachmentStore, AttachmentSummary, StoreError,
};
use billpack_core::{CurrencyCode, DomainError, DomainResult, Money};

use crate::error::ReportResult;
use crate::print::{PrintRequest, ReportType};
use crate::records::{CompanyRef, InvoiceRecord, ShipmentRef, customer_invoices, shipments_of};
use crate::wizard::SettlementWizards;

/// Sort date for invoices that were never sent or dated.
fn min_sort_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanySection {
    pub company: CompanyRef,
    /// Ordered by send date, invoice date, then number.
    pub invoices: Vec<InvoiceRecord>,
    pub total_gtq: Money,
    pub total_usd: Money,
    pub bank_gtq: Option<String>,
    pub bank_usd: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrandTotals {
    pub total_gtq: Money,
    pub total_usd: Money,
}

impl GrandTotals {
    fn of(invoices: &[InvoiceRecord]) -> Self {
        let (total_gtq, total_usd) = currency_totals(invoices);
        Self {
            total_gtq,
            total_usd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReport {
    pub invoices: Vec<InvoiceRecord>,
    /// Distinct shipments, first-seen order.
    pub shipments: Vec<ShipmentRef>,
    /// First shipment, printed in the report header.
    pub shipment: Option<ShipmentRef>,
    pub companies: Vec<CompanySection>,
    pub attachments: AttachmentPartition,
    pub grand_totals: GrandTotals,
    pub today: NaiveDate,
    pub report_type: ReportType,
}

impl SettlementReport {
    /// Build the report data from already resolved attachments.
    ///
    /// # Errors
    ///
    /// Validation error when `invoices` holds no customer invoice.
    pub fn build(
        invoices: &[InvoiceRecord],
        attachments: &[AttachmentSummary],
        report_type: ReportType,
        has_merge: bool,
        today: NaiveDate,
    ) -> DomainResult<Self> {
        let invoices = customer_invoices(invoices)?;
        let shipments = shipments_of(&invoices);

        let mut companies: Vec<&CompanyRef> = Vec::new();
        for invoice in &invoices {
            if !companies.iter().any(|known| known.id == invoice.company.id) {
                companies.push(&invoice.company);
            }
        }
        companies.sort_by(|a, b| a.name.cmp(&b.name));

        let companies = companies
            .into_iter()
            .map(|company| company_section(company, &invoices))
            .collect::<Vec<_>>();

        tracing::debug!(
            invoices = invoices.len(),
            companies = companies.len(),
            shipments = shipments.len(),
            attachments = attachments.len(),
            "settlement report built"
        );

        Ok(Self {
            grand_totals: GrandTotals::of(&invoices),
            shipment: shipments.first().cloned(),
            shipments,
            companies,
            attachments: AttachmentPartition::from_summaries(attachments, has_merge),
            invoices,
            today,
            report_type,
        })
    }

    /// Build the report for a print request.
    ///
    /// With a wizard request the wizard's invoices are used and the
    /// attachments are the request's ordered ids, or the wizard's selection
    /// when the request carries none. Without one, `docs` are filtered to
    /// customer invoices. Whenever that leaves no attachment, every attachment
    /// of the invoices and their shipments is listed.
    pub fn for_request(
        docs: &[InvoiceRecord],
        request: Option<&PrintRequest>,
        wizards: &impl SettlementWizards,
        store: &impl AttachmentStore,
        has_merge: bool,
        today: NaiveDate,
    ) -> ReportResult<Self> {
        let (invoices, report_type, selected) = match request {
            Some(request) => {
                let wizard = wizards.settlement_wizard(request.wizard_id).ok_or_else(|| {
                    DomainError::not_found(format!("settlement wizard {}", request.wizard_id))
                })?;
                let selected = match &request.ordered_attachment_ids {
                    Some(ids) => store
                        .fetch_ordered(ids)?
                        .iter()
                        .map(|descriptor| descriptor.summary())
                        .collect(),
                    None => wizard.selected_attachments(),
                };
                (wizard.invoices().to_vec(), request.report_type, selected)
            }
            None => (customer_invoices(docs)?, ReportType::default(), Vec::new()),
        };

        let attachments = if selected.is_empty() {
            available_attachments(store, &invoices)?
        } else {
            selected
        };

        Ok(Self::build(&invoices, &attachments, report_type, has_merge, today)?)
    }
}

/// Attachments of the invoices' shipments, then of the invoices themselves,
/// without duplicates.
pub fn available_attachments(
    store: &impl AttachmentStore,
    invoices: &[InvoiceRecord],
) -> Result<Vec<AttachmentSummary>, StoreError> {
    let owners: Vec<AttachmentOwner> = shipments_of(invoices)
        .iter()
        .map(|shipment| AttachmentOwner::Shipment(shipment.id))
        .chain(invoices.iter().map(|invoice| AttachmentOwner::Invoice(invoice.id)))
        .collect();

    let mut available: Vec<AttachmentSummary> = Vec::new();
    for summary in store.list(&owners)? {
        if !available.iter().any(|known| known.id == summary.id) {
            available.push(summary);
        }
    }
    Ok(available)
}

fn company_section(company: &CompanyRef, invoices: &[InvoiceRecord]) -> CompanySection {
    let mut own: Vec<InvoiceRecord> = invoices
        .iter()
        .filter(|invoice| invoice.company.id == company.id)
        .cloned()
        .collect();
    own.sort_by(|a, b| {
        let key = |invoice: &InvoiceRecord| {
            (
                invoice.date_sent.unwrap_or_else(min_sort_date),
                invoice.invoice_date.unwrap_or_else(min_sort_date),
                invoice.name.clone(),
            )
        };
        key(a).cmp(&key(b))
    });

    let (total_gtq, total_usd) = currency_totals(&own);
    CompanySection {
        company: company.clone(),
        invoices: own,
        total_gtq,
        total_usd,
        bank_gtq: company.bank_account_gtq.clone(),
        bank_usd: company.bank_account_usd.clone(),
    }
}

/// GTQ and USD totals; other currencies are not reported.
fn currency_totals(invoices: &[InvoiceRecord]) -> (Money, Money) {
    let amounts = invoices.iter().map(|invoice| &invoice.amount_total);
    (
        Money::sum_in(&CurrencyCode::gtq(), amounts.clone()),
        Money::sum_in(&CurrencyCode::usd(), amounts),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures::*;
    use crate::records::MoveType;
    use crate::wizard::SettlementWizard;
    use billpack_attachments::{AttachmentDescriptor, InMemoryAttachmentStore};
    use billpack_core::{AttachmentId, InvoiceId, WizardId};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn usd_invoice(id: u64, name: &str, amount: i64) -> InvoiceRecord {
        let mut invoice = invoice(id, name, amount);
        invoice.amount_total = Money::new(amount, CurrencyCode::usd());
        invoice
    }

    fn pdf(id: u64) -> AttachmentDescriptor {
        AttachmentDescriptor::new(AttachmentId::new(id), format!("doc-{id}.pdf"))
            .with_mime_type("application/pdf")
            .with_payload(b"%PDF".to_vec())
    }

    fn png(id: u64) -> AttachmentDescriptor {
        AttachmentDescriptor::new(AttachmentId::new(id), format!("img-{id}.png"))
            .with_mime_type("image/png")
            .with_payload(b"png".to_vec())
    }

    fn ids(summaries: &[AttachmentSummary]) -> Vec<u64> {
        summaries.iter().map(|s| s.id.get()).collect()
    }

    #[test]
    fn companies_sorted_with_currency_totals_and_banks() {
        let zeta = company(2, "Zeta SA").with_bank_accounts(Some("GT-001".into()), Some("US-009".into()));
        let mut zeta_invoice = invoice(1, "INV/1", 1_000);
        zeta_invoice.company = zeta;
        let invoices = vec![
            zeta_invoice,
            invoice(2, "INV/2", 500),
            usd_invoice(3, "INV/3", 70),
            invoice(4, "INV/4", 250),
        ];

        let report =
            SettlementReport::build(&invoices, &[], ReportType::Normal, true, date(2024, 6, 1)).unwrap();

        let names: Vec<&str> = report.companies.iter().map(|c| c.company.name.as_str()).collect();
        assert_eq!(names, vec!["Main Co", "Zeta SA"]);
        assert_eq!(report.companies[0].total_gtq, Money::new(750, CurrencyCode::gtq()));
        assert_eq!(report.companies[0].total_usd, Money::new(70, CurrencyCode::usd()));
        assert_eq!(report.companies[1].bank_gtq.as_deref(), Some("GT-001"));
        assert_eq!(report.companies[1].bank_usd.as_deref(), Some("US-009"));
        assert_eq!(report.grand_totals.total_gtq.amount, 1_750);
        assert_eq!(report.grand_totals.total_usd.amount, 70);
    }

    #[test]
    fn undated_invoices_sort_first() {
        let invoices = vec![
            invoice(1, "INV/3", 1).with_date_sent(date(2024, 2, 1)),
            invoice(2, "INV/2", 1).with_invoice_date(date(2024, 1, 5)),
            invoice(3, "INV/1", 1),
            invoice(4, "INV/0", 1)
                .with_date_sent(date(2024, 2, 1))
                .with_invoice_date(date(2023, 12, 1)),
        ];
        let report =
            SettlementReport::build(&invoices, &[], ReportType::Normal, true, date(2024, 6, 1)).unwrap();
        let order: Vec<&str> = report.companies[0].invoices.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(order, vec!["INV/1", "INV/2", "INV/3", "INV/0"]);
    }

    #[test]
    fn header_shipment_is_first_seen() {
        let invoices = vec![
            invoice(1, "INV/1", 1),
            invoice(2, "INV/2", 1).with_shipment(shipment(9, "SHP-9")),
            invoice(3, "INV/3", 1).with_shipment(shipment(4, "SHP-4")),
        ];
        let report =
            SettlementReport::build(&invoices, &[], ReportType::Normal, true, date(2024, 6, 1)).unwrap();
        assert_eq!(report.shipment.map(|s| s.name), Some("SHP-9".to_string()));
        assert_eq!(report.shipments.len(), 2);
    }

    #[test]
    fn attachments_are_partitioned_in_order() {
        let summaries = vec![png(1).summary(), pdf(2).summary(), png(3).summary()];
        let report = SettlementReport::build(
            &[invoice(1, "INV/1", 1)],
            &summaries,
            ReportType::Normal,
            false,
            date(2024, 6, 1),
        )
        .unwrap();
        assert_eq!(ids(&report.attachments.images), vec![1, 3]);
        assert_eq!(ids(&report.attachments.pdfs), vec![2]);
        assert_eq!(ids(&report.attachments.all), vec![1, 2, 3]);
        assert!(!report.attachments.has_merge);
    }

    #[test]
    fn available_attachments_list_shipments_first_without_duplicates() {
        let store = InMemoryAttachmentStore::new();
        let invoices = vec![
            invoice(10, "INV/10", 1).with_shipment(shipment(7, "SHP-7")),
            invoice(11, "INV/11", 1),
        ];
        store.insert(AttachmentOwner::Invoice(InvoiceId::new(10)), pdf(1)).unwrap();
        store.insert(AttachmentOwner::Shipment(billpack_core::ShipmentId::new(7)), png(2)).unwrap();
        store.insert(AttachmentOwner::Invoice(InvoiceId::new(11)), pdf(3)).unwrap();
        // Same record linked twice.
        store.insert(AttachmentOwner::Invoice(InvoiceId::new(11)), png(2)).unwrap();

        let available = available_attachments(&store, &invoices).unwrap();
        assert_eq!(ids(&available), vec![2, 1, 3]);
    }

    #[test]
    fn request_ids_take_precedence_and_empty_falls_back_to_all() {
        let store = InMemoryAttachmentStore::new();
        let invoices = vec![invoice(10, "INV/10", 1)];
        for id in [1, 2, 3] {
            store.insert(AttachmentOwner::Invoice(InvoiceId::new(10)), pdf(id)).unwrap();
        }
        let wizard = SettlementWizard::from_parts(WizardId::new(5), invoices.clone(), &store).unwrap();
        let wizards = BTreeMap::from([(wizard.id, wizard)]);

        let request = PrintRequest {
            wizard_id: WizardId::new(5),
            report_type: ReportType::Normal,
            ordered_attachment_ids: Some(vec![AttachmentId::new(3), AttachmentId::new(1)]),
        };
        let report = SettlementReport::for_request(&[], Some(&request), &wizards, &store, true, date(2024, 6, 1))
            .unwrap();
        assert_eq!(ids(&report.attachments.all), vec![3, 1]);

        let reduced = PrintRequest {
            report_type: ReportType::Reduced,
            ordered_attachment_ids: Some(Vec::new()),
            ..request
        };
        let report = SettlementReport::for_request(&[], Some(&reduced), &wizards, &store, true, date(2024, 6, 1))
            .unwrap();
        assert_eq!(report.report_type, ReportType::Reduced);
        assert_eq!(ids(&report.attachments.all), vec![1, 2, 3]);
    }

    #[test]
    fn unknown_wizard_is_not_found() {
        let store = InMemoryAttachmentStore::new();
        let wizards: BTreeMap<WizardId, SettlementWizard> = BTreeMap::new();
        let request = PrintRequest {
            wizard_id: WizardId::new(1),
            report_type: ReportType::Normal,
            ordered_attachment_ids: None,
        };
        let err = SettlementReport::for_request(&[], Some(&request), &wizards, &store, true, date(2024, 6, 1))
            .unwrap_err();
        assert!(matches!(err, crate::ReportError::Domain(DomainError::NotFound(_))));
    }

    #[test]
    fn direct_print_filters_customer_invoices() {
        let store = InMemoryAttachmentStore::new();
        let wizards: BTreeMap<WizardId, SettlementWizard> = BTreeMap::new();
        let mut bill = invoice(2, "BILL/2", 9);
        bill.move_type = MoveType::InInvoice;

        let report = SettlementReport::for_request(
            &[invoice(1, "INV/1", 5), bill],
            None,
            &wizards,
            &store,
            true,
            date(2024, 6, 1),
        )
        .unwrap();
        assert_eq!(report.invoices.len(), 1);
        assert_eq!(report.report_type, ReportType::Normal);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: company totals add up to the grand totals.
        #[test]
        fn company_totals_add_up(
            entries in prop::collection::vec((1u64..4, 0i64..100_000, prop::bool::ANY), 1..25)
        ) {
            let invoices: Vec<InvoiceRecord> = entries
                .iter()
                .enumerate()
                .map(|(index, (company_id, amount, is_usd))| {
                    let mut record = if *is_usd {
                        usd_invoice(index as u64 + 1, &format!("INV/{index}"), *amount)
                    } else {
                        invoice(index as u64 + 1, &format!("INV/{index}"), *amount)
                    };
                    record.company = company(*company_id, &format!("Company {company_id}"));
                    record
                })
                .collect();

            let report = SettlementReport::build(&invoices, &[], ReportType::Normal, true, date(2024, 1, 1)).unwrap();
            let gtq: i64 = report.companies.iter().map(|c| c.total_gtq.amount).sum();
            let usd: i64 = report.companies.iter().map(|c| c.total_usd.amount).sum();
            prop_assert_eq!(gtq, report.grand_totals.total_gtq.amount);
            prop_assert_eq!(usd, report.grand_totals.total_usd.amount);
            let listed: usize = report.companies.iter().map(|c| c.invoices.len()).sum();
            prop_assert_eq!(listed, invoices.len());
        }
    }
}
