//! Service credentials read from the environment (or a `.env` file loaded
//! by the binary). Loading fails with every missing key listed at once.

use crate::utils::error::{Result, ScanError};
use crate::utils::validation::{validate_url, Validate};

pub const OCR_URL: &str = "OCR_URL";
pub const OCR_TOKEN: &str = "OCR_TOKEN";
pub const LLM_URL: &str = "LLM_URL";
pub const LLM_TOKEN: &str = "LLM_TOKEN";
pub const LLM_VEGAN_SYSTEM_PROMPT: &str = "LLM_VEGAN_SYSTEM_PROMPT";

/// Collects required keys, remembering which ones were absent or blank.
struct RequiredKeys<F: Fn(&str) -> Option<String>> {
    lookup: F,
    missing: Vec<String>,
}

impl<F: Fn(&str) -> Option<String>> RequiredKeys<F> {
    fn new(lookup: F) -> Self {
        Self {
            lookup,
            missing: Vec::new(),
        }
    }

    fn take(&mut self, key: &str) -> String {
        match (self.lookup)(key).filter(|v| !v.trim().is_empty()) {
            Some(value) => value,
            None => {
                self.missing.push(key.to_string());
                String::new()
            }
        }
    }

    fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ScanError::MissingConfigError {
                keys: self.missing,
            })
        }
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[derive(Clone)]
pub struct OcrCredentials {
    pub url: String,
    pub api_key: String,
}

impl OcrCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut keys = RequiredKeys::new(lookup);
        let credentials = Self {
            url: keys.take(OCR_URL),
            api_key: keys.take(OCR_TOKEN),
        };
        keys.finish()?;
        credentials.validate()?;
        Ok(credentials)
    }
}

impl Validate for OcrCredentials {
    fn validate(&self) -> Result<()> {
        validate_url(OCR_URL, &self.url)
    }
}

// 不要把金鑰印進日誌
impl std::fmt::Debug for OcrCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrCredentials")
            .field("url", &self.url)
            .field("api_key", &"***")
            .finish()
    }
}

#[derive(Clone)]
pub struct LlmCredentials {
    pub url: String,
    pub token: String,
    pub system_prompt: String,
}

impl LlmCredentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut keys = RequiredKeys::new(lookup);
        let credentials = Self {
            url: keys.take(LLM_URL),
            token: keys.take(LLM_TOKEN),
            system_prompt: keys.take(LLM_VEGAN_SYSTEM_PROMPT),
        };
        keys.finish()?;
        credentials.validate()?;
        Ok(credentials)
    }
}

impl Validate for LlmCredentials {
    fn validate(&self) -> Result<()> {
        validate_url(LLM_URL, &self.url)
    }
}

impl std::fmt::Debug for LlmCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmCredentials")
            .field("url", &self.url)
            .field("token", &"***")
            .field("system_prompt_chars", &self.system_prompt.chars().count())
            .finish()
    }
}
