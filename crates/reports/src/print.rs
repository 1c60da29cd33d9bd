//! Print requests and the settlement post-render hook.

use serde::{Deserialize, Serialize};

use billpack_attachments::AttachmentStore;
use billpack_core::{AttachmentId, WizardId};
use billpack_merge::{MergePipeline, RenderedDocument};

use crate::wizard::SettlementWizards;

/// Report name of the expense settlement report on the host.
pub const SETTLEMENT_REPORT_NAME: &str = "billpack.report_expense_settlement";

/// Report name of the delivered invoices report on the host.
pub const DELIVERED_REPORT_NAME: &str = "billpack.report_delivered_invoices";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Full report with the selected attachments appended.
    #[default]
    Normal,
    /// Summary layout; never carries attachments.
    Reduced,
}

/// Data the settlement wizard hands to the report engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintRequest {
    pub wizard_id: WizardId,
    #[serde(default)]
    pub report_type: ReportType,
    /// Attachments in print order. `None` means "use the wizard's selection";
    /// an empty list means "no attachments".
    #[serde(default)]
    pub ordered_attachment_ids: Option<Vec<AttachmentId>>,
}

/// Post-process a rendered report.
///
/// Only the settlement report printed from a wizard gets its attachments
/// appended; every other document is returned as rendered.
pub fn render_settlement(
    report_name: &str,
    base: RenderedDocument,
    request: Option<&PrintRequest>,
    wizards: &impl SettlementWizards,
    store: &impl AttachmentStore,
    pipeline: &MergePipeline,
) -> RenderedDocument {
    if report_name != SETTLEMENT_REPORT_NAME {
        return base;
    }
    let Some(request) = request else {
        return base;
    };

    if !pipeline.config().capabilities.document_merge {
        tracing::warn!(
            wizard_id = %request.wizard_id,
            "PDF merge unavailable; settlement printed without attachments"
        );
        return base;
    }

    let Some(wizard) = wizards.settlement_wizard(request.wizard_id) else {
        tracing::debug!(wizard_id = %request.wizard_id, "settlement wizard gone; nothing to append");
        return base;
    };

    let ids = match &request.ordered_attachment_ids {
        Some(ids) => ids.clone(),
        None => wizard.ordered_attachment_ids(),
    };
    if ids.is_empty() {
        return base;
    }

    let attachments = match store.fetch_ordered(&ids) {
        Ok(attachments) => attachments,
        Err(err) => {
            tracing::warn!(
                wizard_id = %request.wizard_id,
                error = %err,
                "cannot load attachments; settlement printed without them"
            );
            return base;
        }
    };

    tracing::info!(
        wizard_id = %request.wizard_id,
        report_type = ?request.report_type,
        attachments = attachments.len(),
        "appending attachments to settlement report"
    );
    pipeline.merge_rendered(base, &attachments)
}
