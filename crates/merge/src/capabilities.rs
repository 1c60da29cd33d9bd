//! Optional processing capabilities, resolved once per process.
//!
//! Both codecs are linked in, so availability is a deployment decision:
//! operators can switch either one off through the environment (e.g. while a
//! malformed-input problem is investigated) without redeploying.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Environment switch for PDF concatenation.
pub const PDF_MERGE_ENV: &str = "BILLPACK_PDF_MERGE";

/// Environment switch for image-to-PDF conversion.
pub const IMAGE_TO_PDF_ENV: &str = "BILLPACK_IMAGE_TO_PDF";

/// The two independent feature flags the pipeline consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    /// Can PDF payloads be concatenated at all.
    pub document_merge: bool,
    /// Can raster images be re-encoded as single-page PDFs.
    pub image_to_document: bool,
}

impl Capabilities {
    pub const fn all() -> Self {
        Self {
            document_merge: true,
            image_to_document: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            document_merge: false,
            image_to_document: false,
        }
    }

    pub const fn with_document_merge(mut self, enabled: bool) -> Self {
        self.document_merge = enabled;
        self
    }

    pub const fn with_image_to_document(mut self, enabled: bool) -> Self {
        self.image_to_document = enabled;
        self
    }

    /// Probe the process environment.
    pub fn detect() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Probe using an arbitrary key lookup (the environment in production).
    ///
    /// Each disabled capability is reported once at `warn`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let caps = Self {
            document_merge: switch_enabled(lookup(PDF_MERGE_ENV).as_deref()),
            image_to_document: switch_enabled(lookup(IMAGE_TO_PDF_ENV).as_deref()),
        };

        if !caps.document_merge {
            tracing::warn!(
                switch = PDF_MERGE_ENV,
                "PDF merge disabled; attachments will not be concatenated"
            );
        }
        if !caps.image_to_document {
            tracing::warn!(
                switch = IMAGE_TO_PDF_ENV,
                "image conversion disabled; image attachments will be left out"
            );
        }

        caps
    }

    /// Process-wide capabilities, detected on first use.
    pub fn global() -> Self {
        static GLOBAL: OnceLock<Capabilities> = OnceLock::new();
        *GLOBAL.get_or_init(Self::detect)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

/// Unset means enabled; only an explicit "off" value disables.
fn switch_enabled(value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) => !matches!(v.as_str(), "0" | "false" | "off" | "no"),
        None => true,
    }
}
