use serde::Serialize;

use billpack_attachments::{AttachmentStore, AttachmentSummary};
use billpack_core::{AttachmentId, DomainError, DomainResult, WizardId};

use crate::error::ReportResult;
use crate::print::{PrintRequest, ReportType};
use crate::records::{InvoiceRecord, ShipmentRef, shipments_of};
use crate::settlement::available_attachments;

use super::ActiveContext;

/// One available attachment with its include flag and print position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentLine {
    pub attachment: AttachmentSummary,
    pub included: bool,
    pub sequence: u32,
}

/// Attachment picker for the expense settlement report.
///
/// Lines are kept in print order; `sequence` always equals the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementWizard {
    pub id: WizardId,
    invoices: Vec<InvoiceRecord>,
    shipments: Vec<ShipmentRef>,
    lines: Vec<AttachmentLine>,
}

impl SettlementWizard {
    /// Open the wizard on the host's current selection, every available
    /// attachment included.
    ///
    /// # Errors
    ///
    /// Validation errors for a selection that is not a list of customer
    /// invoices; store errors while listing attachments.
    pub fn open(
        id: WizardId,
        context: &ActiveContext,
        records: &[InvoiceRecord],
        store: &impl AttachmentStore,
    ) -> ReportResult<Self> {
        let invoices = context.customer_selection(records)?;
        Self::from_parts(id, invoices, store)
    }

    /// Wizard over already validated customer invoices.
    pub fn from_parts(
        id: WizardId,
        invoices: Vec<InvoiceRecord>,
        store: &impl AttachmentStore,
    ) -> ReportResult<Self> {
        let shipments = shipments_of(&invoices);
        let lines = available_attachments(store, &invoices)?
            .into_iter()
            .zip(0u32..)
            .map(|(attachment, sequence)| AttachmentLine {
                attachment,
                included: true,
                sequence,
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            wizard_id = %id,
            invoices = invoices.len(),
            shipments = shipments.len(),
            attachments = lines.len(),
            "settlement wizard opened"
        );

        Ok(Self {
            id,
            invoices,
            shipments,
            lines,
        })
    }

    pub fn invoices(&self) -> &[InvoiceRecord] {
        &self.invoices
    }

    pub fn shipments(&self) -> &[ShipmentRef] {
        &self.shipments
    }

    pub fn lines(&self) -> &[AttachmentLine] {
        &self.lines
    }

    pub fn select_all(&mut self) {
        for line in &mut self.lines {
            line.included = true;
        }
    }

    pub fn deselect_all(&mut self) {
        for line in &mut self.lines {
            line.included = false;
        }
    }

    pub fn set_included(&mut self, attachment: AttachmentId, included: bool) -> DomainResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.attachment.id == attachment)
            .ok_or_else(|| unknown_line(attachment))?;
        line.included = included;
        Ok(())
    }

    /// Move a line to `new_index` (clamped to the end), shifting the others.
    pub fn move_line(&mut self, attachment: AttachmentId, new_index: usize) -> DomainResult<()> {
        let from = self
            .lines
            .iter()
            .position(|line| line.attachment.id == attachment)
            .ok_or_else(|| unknown_line(attachment))?;

        let line = self.lines.remove(from);
        let to = new_index.min(self.lines.len());
        self.lines.insert(to, line);
        for (line, sequence) in self.lines.iter_mut().zip(0u32..) {
            line.sequence = sequence;
        }
        Ok(())
    }

    /// Included attachments in print order.
    pub fn ordered_attachment_ids(&self) -> Vec<AttachmentId> {
        let mut included: Vec<&AttachmentLine> = self.lines.iter().filter(|line| line.included).collect();
        included.sort_by_key(|line| line.sequence);
        included.into_iter().map(|line| line.attachment.id).collect()
    }

    /// Summaries of the included attachments in print order.
    pub fn selected_attachments(&self) -> Vec<AttachmentSummary> {
        self.ordered_attachment_ids()
            .into_iter()
            .filter_map(|id| {
                self.lines
                    .iter()
                    .find(|line| line.attachment.id == id)
                    .map(|line| line.attachment.clone())
            })
            .collect()
    }

    /// The request handed to the report engine. The reduced report never
    /// carries attachments.
    pub fn print_request(&self, report_type: ReportType) -> PrintRequest {
        let ids = match report_type {
            ReportType::Reduced => Vec::new(),
            ReportType::Normal => self.ordered_attachment_ids(),
        };
        PrintRequest {
            wizard_id: self.id,
            report_type,
            ordered_attachment_ids: Some(ids),
        }
    }
}

fn unknown_line(attachment: AttachmentId) -> DomainError {
    DomainError::not_found(format!("attachment {attachment} is not available in this wizard"))
}
