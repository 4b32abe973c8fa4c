use crate::domain::model::{BatchSummary, ItemOutcome, SourceEntry};
use crate::domain::ports::{ItemProcessor, Storage};
use crate::utils::error::Result;
use chrono::Utc;
use std::path::Path;

/// Walks one flat input directory and hands every accepted entry to an
/// [`ItemProcessor`], strictly one at a time.
///
/// Per-item failures are recorded in the returned [`BatchSummary`] and never
/// stop the loop. The only error returned is failing to list `input_dir`.
pub struct BatchRunner<S: Storage> {
    storage: S,
}

impl<S: Storage> BatchRunner<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn run<P: ItemProcessor>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        allowed_extensions: &[String],
        processor: &P,
    ) -> Result<BatchSummary> {
        let mut summary = BatchSummary::new(processor.label(), input_dir);

        tracing::info!("📕 Reading files from {} folder...", input_dir.display());
        let entries = self.storage.list_entries(input_dir).await?;
        let accepted: Vec<SourceEntry> = entries
            .into_iter()
            .filter(|entry| entry.is_accepted(allowed_extensions))
            .collect();
        tracing::debug!("{} entries accepted for {}", accepted.len(), processor.label());

        for entry in accepted {
            let output_path =
                output_dir.join(entry.output_file_name(processor.target_extension()));

            match processor.process(&entry, &output_path).await {
                Ok(ItemOutcome::Written(path)) => summary.written.push(path),
                Ok(ItemOutcome::Skipped(reason)) => {
                    tracing::error!("❌ Skipped '{}': {}", entry.path.display(), reason);
                    summary.skipped.push((entry.path, reason));
                }
                Err(e) => {
                    tracing::error!(
                        "❌ Error in processing '{}': {} (Category: {:?})",
                        entry.path.display(),
                        e,
                        e.category()
                    );
                    summary.failed.push((entry.path, e.to_string()));
                }
            }
        }

        summary.finished_at = Utc::now();
        Ok(summary)
    }
}
