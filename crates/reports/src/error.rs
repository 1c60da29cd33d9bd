use thiserror::Error;

use billpack_attachments::StoreError;
use billpack_core::DomainError;

pub type ReportResult<T> = Result<T, ReportError>;

/// Failure while preparing report data or a wizard.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
