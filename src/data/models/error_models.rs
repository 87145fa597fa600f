use thiserror::Error;
use validator::ValidationErrors;

/// Errors the scheduling core surfaces to callers.
///
/// Idempotency-key races are resolved internally and never appear
/// here; callers only ever see caller errors or store outages.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<diesel::result::Error> for ReviewError {
    fn from(err: diesel::result::Error) -> Self {
        ReviewError::StoreUnavailable(err.to_string())
    }
}

impl From<r2d2::Error> for ReviewError {
    fn from(err: r2d2::Error) -> Self {
        ReviewError::StoreUnavailable(err.to_string())
    }
}

impl From<ValidationErrors> for ReviewError {
    fn from(err: ValidationErrors) -> Self {
        ReviewError::Validation(err.to_string())
    }
}
