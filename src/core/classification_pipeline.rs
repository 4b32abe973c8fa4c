use crate::adapters::http::LlmClient;
use crate::core::extract::extract_json_object;
use crate::domain::model::{ClassificationRecord, ItemOutcome, SourceEntry};
use crate::domain::ports::{ItemProcessor, Storage};
use crate::utils::error::{Result, ScanError};
use async_trait::async_trait;
use std::path::Path;

/// Recognized ingredient text -> normalized diet record.
pub struct ClassificationProcessor<S: Storage> {
    storage: S,
    client: LlmClient,
}

impl<S: Storage> ClassificationProcessor<S> {
    pub fn new(storage: S, client: LlmClient) -> Self {
        Self { storage, client }
    }
}

#[async_trait]
impl<S: Storage> ItemProcessor for ClassificationProcessor<S> {
    fn label(&self) -> &str {
        "classification"
    }

    fn target_extension(&self) -> &str {
        ".json"
    }

    async fn process(&self, entry: &SourceEntry, output_path: &Path) -> Result<ItemOutcome> {
        let source = entry.path.display();
        tracing::debug!("🔍 Classifying text from '{}'...", source);

        let bytes = self.storage.read_file(&entry.path).await?;
        let text = String::from_utf8(bytes).map_err(|e| ScanError::ProcessingError {
            message: format!("'{}' is not valid UTF-8: {}", source, e),
        })?;

        let response = self.client.complete(&text).await?;
        let content = match response.first_content() {
            Ok(content) => content,
            Err(reason) => {
                tracing::error!("❌ Error in classifying text from '{}'.", source);
                if let Some(error) = &response.error {
                    tracing::error!("LLM service error: {}", error);
                }
                return Ok(ItemOutcome::Skipped(reason));
            }
        };
        tracing::debug!("✅ Classified text for file '{}'.", source);

        let object = match extract_json_object(&content) {
            Ok(object) => object,
            Err(err) => {
                tracing::warn!("❌ LLM sent no parsable json for '{}'.", source);
                tracing::warn!("rawOutput: {}", err.raw());
                tracing::warn!("jsonSubstring: {}", err.candidate());
                return Ok(ItemOutcome::Skipped(err.into()));
            }
        };
        let record = ClassificationRecord::from_object(&object);

        tracing::debug!("🔧 Creating output file for '{}'...", source);
        let json = serde_json::to_string_pretty(&record)?;
        self.storage.write_file(output_path, json.as_bytes()).await?;
        tracing::debug!("✅ Output file created for '{}'.", source);

        tracing::info!("{}", record.summary_line());
        Ok(ItemOutcome::Written(output_path.to_path_buf()))
    }
}
