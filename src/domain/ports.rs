use crate::domain::model::{ItemOutcome, SourceEntry};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait Storage: Send + Sync {
    /// Flat listing of `dir`, no recursion, in whatever order the backend yields.
    fn list_entries(
        &self,
        dir: &Path,
    ) -> impl std::future::Future<Output = Result<Vec<SourceEntry>>> + Send;
    fn read_file(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Handles one accepted entry: read, call the remote service, extract, write.
#[async_trait]
pub trait ItemProcessor: Send + Sync {
    /// Short label used in log lines and the final summary ("OCR").
    fn label(&self) -> &str;

    /// Extension of the produced artifact, with its leading dot.
    fn target_extension(&self) -> &str;

    async fn process(&self, entry: &SourceEntry, output_path: &Path) -> Result<ItemOutcome>;
}
