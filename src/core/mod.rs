pub mod batch;
pub mod classification_pipeline;
pub mod extract;
pub mod ocr_pipeline;

pub use crate::domain::model::{BatchSummary, ItemOutcome, SkipReason, SourceEntry};
pub use crate::domain::ports::{ItemProcessor, Storage};
pub use crate::utils::error::Result;
