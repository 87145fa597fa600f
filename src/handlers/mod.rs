pub mod reviews;

pub use reviews::reviews_router;
