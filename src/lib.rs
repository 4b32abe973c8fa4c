pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{LlmCredentials, OcrCredentials, ScanConfig};

pub use adapters::http::{LlmClient, OcrClient};
pub use adapters::storage::LocalStorage;
pub use crate::core::{
    batch::BatchRunner, classification_pipeline::ClassificationProcessor,
    extract::extract_json_object, ocr_pipeline::OcrProcessor,
};
pub use utils::error::{Result, ScanError};
