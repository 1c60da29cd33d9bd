//! Tracing and logging setup shared by the billpack binaries.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::Json);
}

/// Initialize with human-readable output (interactive CLI use).
pub fn init_pretty() {
    tracing::init(tracing::LogFormat::Text);
}

/// Tracing configuration (filters, formatters).
pub mod tracing;
