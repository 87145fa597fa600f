pub mod error_models;
pub mod review_models;

pub use error_models::ReviewError;
pub use review_models::{
    DueCardsQuery, DueCardsResponse, NewReviewRecord, ReviewRecord,
    SubmitReviewRequest, SubmitReviewResponse,
};
