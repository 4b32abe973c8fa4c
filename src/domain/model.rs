use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One entry of the input directory, discovered fresh on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub path: PathBuf,
    pub extension: String,
    pub is_file: bool,
}

impl SourceEntry {
    pub fn new(path: PathBuf, is_file: bool) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = detect_extension(&name);

        Self {
            name,
            path,
            extension,
            is_file,
        }
    }

    /// Same base name, target extension swapped in (`apple.png` -> `apple.txt`).
    pub fn output_file_name(&self, target_extension: &str) -> String {
        let stem = self
            .name
            .strip_suffix(self.extension.as_str())
            .unwrap_or(&self.name);
        format!("{}{}", stem, target_extension)
    }

    pub fn is_accepted(&self, allowed_extensions: &[String]) -> bool {
        self.is_file && allowed_extensions.iter().any(|ext| *ext == self.extension)
    }
}

/// Extension including its leading dot. Dotfiles such as `.env` have none.
pub fn detect_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Drops literal two-character `\n` sequences left behind by the upstream services.
pub fn strip_escaped_newlines(text: &str) -> String {
    text.replace("\\n", "")
}

// OCR service payload

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrResponse {
    #[serde(rename = "ParsedResults", default)]
    pub parsed_results: Option<Vec<ParsedResult>>,
    #[serde(rename = "IsErroredOnProcessing", default)]
    pub is_errored_on_processing: Option<bool>,
    #[serde(rename = "ErrorMessage", default)]
    pub error_message: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParsedResult {
    #[serde(rename = "ParsedText", default)]
    pub parsed_text: Option<String>,
}

impl OcrResponse {
    /// Text of the first parsed block, or why there is none.
    pub fn recognized_text(&self) -> std::result::Result<String, SkipReason> {
        let first = self
            .parsed_results
            .as_ref()
            .and_then(|results| results.first())
            .ok_or(SkipReason::MissingParsedResults)?;

        let text = first
            .parsed_text
            .as_deref()
            .ok_or(SkipReason::MissingParsedText)?;

        Ok(strip_escaped_newlines(text))
    }
}

// LLM chat-completion payload

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Option<Vec<ChatChoice>>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Raw content of the first choice, handed to the extractor as-is.
    pub fn first_content(&self) -> std::result::Result<String, SkipReason> {
        let first = self
            .choices
            .as_ref()
            .and_then(|choices| choices.first())
            .ok_or(SkipReason::MissingChoices)?;

        Ok(first
            .message
            .as_ref()
            .and_then(|m| m.content.clone())
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DietVerdict {
    Vegan,
    NotVegan,
    Unknown,
}

impl DietVerdict {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "vegan" => DietVerdict::Vegan,
            "not vegan" | "nicht vegan" | "non-vegan" | "non vegan" | "not-vegan" => {
                DietVerdict::NotVegan
            }
            _ => DietVerdict::Unknown,
        }
    }

    pub fn indicator(&self) -> &'static str {
        match self {
            DietVerdict::Vegan => "🥬",
            DietVerdict::NotVegan => "🍖",
            DietVerdict::Unknown => "🤷",
        }
    }
}

/// Normalized classification stage output, one per ingredient text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grocery_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_reason: Option<String>,
}

impl ClassificationRecord {
    /// Any extracted JSON object yields a record; unknown keys are dropped and
    /// non-string values are rendered as their JSON text.
    pub fn from_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let field = |key: &str| {
            object.get(key).and_then(|value| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
        };

        Self {
            diet: field("diet"),
            grocery_type: field("groceryType"),
            diet_reason: field("dietReason"),
        }
    }

    pub fn verdict(&self) -> DietVerdict {
        self.diet
            .as_deref()
            .map(DietVerdict::parse)
            .unwrap_or(DietVerdict::Unknown)
    }

    /// Console line, e.g. `🥬 syrup: no animal ingredients`.
    pub fn summary_line(&self) -> String {
        format!(
            "{} {}: {}",
            self.verdict().indicator(),
            self.grocery_type.as_deref().unwrap_or("unknown"),
            self.diet_reason.as_deref().unwrap_or("no reason given")
        )
    }
}

/// Recognized, non-fatal reasons for leaving an item without output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingParsedResults,
    MissingParsedText,
    MissingChoices,
    NoJsonObject,
    InvalidJson(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingParsedResults => write!(f, "response has no ParsedResults"),
            SkipReason::MissingParsedText => write!(f, "first parsed result has no ParsedText"),
            SkipReason::MissingChoices => write!(f, "response has no choices"),
            SkipReason::NoJsonObject => write!(f, "model sent no parsable json"),
            SkipReason::InvalidJson(e) => write!(f, "invalid json: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Written(PathBuf),
    Skipped(SkipReason),
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub label: String,
    pub input_dir: PathBuf,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub failed: Vec<(PathBuf, String)>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    pub fn new(label: impl Into<String>, input_dir: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            label: label.into(),
            input_dir: input_dir.into(),
            written: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn attempted(&self) -> usize {
        self.written.len() + self.skipped.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🏁 Finished {} for all files in {} folder ({} written, {} skipped, {} failed in {}ms).",
            self.label,
            self.input_dir.display(),
            self.written.len(),
            self.skipped.len(),
            self.failed.len(),
            (self.finished_at - self.started_at).num_milliseconds()
        )
    }
}
