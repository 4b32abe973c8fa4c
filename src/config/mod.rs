#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use env::{LlmCredentials, OcrCredentials};
pub use toml_config::{ClassificationSection, OcrSection, ScanConfig};
