//! `billpack-merge`: append attachments to a rendered PDF from the shell.
//!
//! Attachments are appended in argument order; their type is guessed from the
//! file extension the same way the host guesses an upload's MIME type.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use billpack_attachments::AttachmentDescriptor;
use billpack_core::AttachmentId;
use billpack_merge::config::{DEFAULT_IMAGE_DPI, DEFAULT_MAX_IMAGE_DIMENSION};
use billpack_merge::{Capabilities, MergeConfig, MergePipeline, MergeReport, MergeSummary};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "billpack-merge",
    version,
    about = "Append PDF and image attachments to a rendered PDF, in order"
)]
pub struct Args {
    /// Rendered report the attachments are appended to.
    #[arg(long, value_name = "PDF")]
    pub base: PathBuf,

    /// Attachment to append (repeatable; order is kept).
    #[arg(short, long = "attach", value_name = "FILE")]
    pub attach: Vec<PathBuf>,

    /// Where to write the merged PDF.
    #[arg(short, long, value_name = "PDF")]
    pub output: PathBuf,

    /// Leave image attachments out.
    #[arg(long)]
    pub no_images: bool,

    /// Do not merge at all; the base is copied to the output.
    #[arg(long)]
    pub no_merge: bool,

    /// Print the merge report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Longest side, in pixels, of an embedded image.
    #[arg(long, value_name = "PX", default_value_t = DEFAULT_MAX_IMAGE_DIMENSION)]
    pub max_image_dimension: u32,

    /// Resolution images are placed at.
    #[arg(long, value_name = "DPI", default_value_t = DEFAULT_IMAGE_DPI)]
    pub dpi: f32,
}

impl Args {
    /// Pipeline configuration: process capabilities narrowed by the flags.
    pub fn merge_config(&self) -> MergeConfig {
        let detected = Capabilities::global();
        let capabilities = detected
            .with_document_merge(detected.document_merge && !self.no_merge)
            .with_image_to_document(detected.image_to_document && !self.no_images);

        MergeConfig::default()
            .with_capabilities(capabilities)
            .with_max_image_dimension(self.max_image_dimension)
            .with_image_dpi(self.dpi)
    }
}

/// Read the inputs, merge, and write the output file.
pub fn run(args: &Args) -> anyhow::Result<MergeReport> {
    let base = fs::read(&args.base)
        .with_context(|| format!("failed to read base document {}", args.base.display()))?;

    let attachments = args
        .attach
        .iter()
        .zip(1u64..)
        .map(|(path, id)| describe(path, AttachmentId::new(id)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let report = MergePipeline::new(args.merge_config()).merge_with_report(&base, &attachments);

    fs::write(&args.output, &report.bytes)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    tracing::info!(
        output = %args.output.display(),
        outcome = ?report.outcome,
        bytes = report.bytes.len(),
        "merged document written"
    );
    Ok(report)
}

/// Descriptor for a file on disk; MIME type guessed from its extension.
pub fn describe(path: &Path, id: AttachmentId) -> anyhow::Result<AttachmentDescriptor> {
    let payload =
        fs::read(path).with_context(|| format!("failed to read attachment {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let descriptor = AttachmentDescriptor::new(id, name).with_payload(payload);
    Ok(match mime_guess::from_path(path).first() {
        Some(mime) => descriptor.with_mime_type(mime.essence_str()),
        None => descriptor,
    })
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    output: &'a Path,
    #[serde(flatten)]
    summary: MergeSummary,
}

/// Human or JSON rendering of a merge report.
pub fn render_report(args: &Args, report: &MergeReport) -> anyhow::Result<String> {
    if args.json {
        let json = JsonReport {
            output: &args.output,
            summary: report.summary(),
        };
        return Ok(serde_json::to_string_pretty(&json)?);
    }

    let mut out = format!(
        "{}: {} merged, {} skipped ({:?})",
        args.output.display(),
        report.merged.len(),
        report.skipped.len(),
        report.outcome,
    );
    for skipped in &report.skipped {
        out.push_str(&format!("\n  skipped {}: {}", skipped.name, skipped.reason));
    }
    Ok(out)
}
