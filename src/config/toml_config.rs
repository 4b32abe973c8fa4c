use crate::utils::error::{Result, ScanError};
use crate::utils::validation::{
    validate_extensions, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "grocery-scan.toml";

/// Optional tuning file. Every field has a default, so an absent file or an
/// empty section behaves like the stock batch scripts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub ocr: OcrSection,
    pub classification: ClassificationSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSection {
    pub input_dir: String,
    pub output_dir: String,
    pub extensions: Vec<String>,
    pub engine: String,
    pub scale: bool,
    pub is_table: bool,
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            input_dir: "ocr-input".to_string(),
            output_dir: "ocr-output".to_string(),
            extensions: vec![".png".to_string(), ".jpg".to_string(), ".jpeg".to_string()],
            engine: "2".to_string(),
            scale: true,
            is_table: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationSection {
    pub input_dir: String,
    pub output_dir: String,
    pub extensions: Vec<String>,
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl Default for ClassificationSection {
    fn default() -> Self {
        Self {
            input_dir: "ocr-output".to_string(),
            output_dir: "classification-output".to_string(),
            extensions: vec![".txt".to_string()],
            model: None,
            temperature: 0.01,
            max_tokens: 256,
            frequency_penalty: 0.9,
            presence_penalty: 0.9,
        }
    }
}

impl ScanConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScanError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given, otherwise `grocery-scan.toml` if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScanError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LLM_MODEL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScanError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for ScanConfig {
    fn validate(&self) -> Result<()> {
        validate_path("ocr.input_dir", &self.ocr.input_dir)?;
        validate_path("ocr.output_dir", &self.ocr.output_dir)?;
        validate_extensions("ocr.extensions", &self.ocr.extensions)?;
        validate_non_empty_string("ocr.engine", &self.ocr.engine)?;

        let classification = &self.classification;
        validate_path("classification.input_dir", &classification.input_dir)?;
        validate_path("classification.output_dir", &classification.output_dir)?;
        validate_extensions("classification.extensions", &classification.extensions)?;
        validate_range("classification.temperature", classification.temperature, 0.0, 2.0)?;
        validate_range(
            "classification.frequency_penalty",
            classification.frequency_penalty,
            -2.0,
            2.0,
        )?;
        validate_range(
            "classification.presence_penalty",
            classification.presence_penalty,
            -2.0,
            2.0,
        )?;
        validate_positive_number("classification.max_tokens", classification.max_tokens, 1)?;

        if let Some(model) = &classification.model {
            validate_non_empty_string("classification.model", model)?;
        }

        Ok(())
    }
}
