use crate::adapters::http::OcrClient;
use crate::domain::model::{ItemOutcome, SourceEntry};
use crate::domain::ports::{ItemProcessor, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Image -> recognized text file.
pub struct OcrProcessor<S: Storage> {
    storage: S,
    client: OcrClient,
}

impl<S: Storage> OcrProcessor<S> {
    pub fn new(storage: S, client: OcrClient) -> Self {
        Self { storage, client }
    }
}

#[async_trait]
impl<S: Storage> ItemProcessor for OcrProcessor<S> {
    fn label(&self) -> &str {
        "OCR"
    }

    fn target_extension(&self) -> &str {
        ".txt"
    }

    async fn process(&self, entry: &SourceEntry, output_path: &Path) -> Result<ItemOutcome> {
        let source = entry.path.display();
        tracing::info!("🔍 Recognizing text from '{}'...", source);

        let data = self.storage.read_file(&entry.path).await?;
        let response = self
            .client
            .recognize(data, &entry.name, &entry.extension)
            .await?;

        let text = match response.recognized_text() {
            Ok(text) => text,
            Err(reason) => {
                tracing::error!("❌ Error in recognizing text from '{}'.", source);
                if let Some(message) = &response.error_message {
                    tracing::error!(
                        "OCR service error (errored on processing: {:?}): {}",
                        response.is_errored_on_processing,
                        message
                    );
                }
                return Ok(ItemOutcome::Skipped(reason));
            }
        };
        tracing::info!("✅ Recognized text for file '{}'.", source);

        tracing::info!("🔧 Creating output file for '{}'...", source);
        self.storage.write_file(output_path, text.as_bytes()).await?;
        tracing::info!("✅ Output file created for '{}'.", source);

        Ok(ItemOutcome::Written(output_path.to_path_buf()))
    }
}

