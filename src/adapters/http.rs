//! Outbound calls to the OCR and chat-completion services.
//!
//! Both clients send exactly one request per call, with no timeout and no
//! retry. The body is decoded whatever the status code; deciding whether the
//! expected top-level field is present is left to the caller.

use crate::config::env::{LlmCredentials, OcrCredentials};
use crate::config::toml_config::{ClassificationSection, OcrSection};
use crate::domain::model::{ChatCompletionResponse, OcrResponse};
use crate::utils::error::Result;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;

/// `.jpeg` -> `JPEG`
pub fn ocr_file_type(extension: &str) -> String {
    extension.replacen('.', "", 1).to_uppercase()
}

#[derive(Debug, Clone)]
pub struct OcrClient {
    client: Client,
    credentials: OcrCredentials,
    engine: String,
    scale: bool,
    is_table: bool,
}

impl OcrClient {
    pub fn new(credentials: OcrCredentials, section: &OcrSection) -> Self {
        Self {
            client: Client::new(),
            credentials,
            engine: section.engine.clone(),
            scale: section.scale,
            is_table: section.is_table,
        }
    }

    fn build_form(&self, data: Vec<u8>, filename: &str, extension: &str) -> Form {
        Form::new()
            .text("scale", self.scale.to_string())
            .text("isTable", self.is_table.to_string())
            .text("OCREngine", self.engine.clone())
            .text("filetype", ocr_file_type(extension))
            .part("file", Part::bytes(data).file_name(filename.to_string()))
    }

    pub async fn recognize(
        &self,
        data: Vec<u8>,
        filename: &str,
        extension: &str,
    ) -> Result<OcrResponse> {
        tracing::debug!("Making OCR request to: {}", self.credentials.url);

        let response = self
            .client
            .post(&self.credentials.url)
            .header("apikey", &self.credentials.api_key)
            .multipart(self.build_form(data, filename, extension))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("OCR response status: {}", status);
        if !status.is_success() {
            tracing::warn!("OCR service answered {} for '{}'", status, filename);
        }

        Ok(response.json::<OcrResponse>().await?)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f64,
    max_tokens: u32,
    frequency_penalty: f64,
    presence_penalty: f64,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    client: Client,
    credentials: LlmCredentials,
    section: ClassificationSection,
}

impl LlmClient {
    pub fn new(credentials: LlmCredentials, section: &ClassificationSection) -> Self {
        Self {
            client: Client::new(),
            credentials,
            section: section.clone(),
        }
    }

    fn build_request<'a>(&'a self, text: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: self.section.model.as_deref(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.credentials.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: self.section.temperature,
            max_tokens: self.section.max_tokens,
            frequency_penalty: self.section.frequency_penalty,
            presence_penalty: self.section.presence_penalty,
            stream: false,
        }
    }

    pub async fn complete(&self, text: &str) -> Result<ChatCompletionResponse> {
        tracing::debug!("Making chat completion request to: {}", self.credentials.url);

        let response = self
            .client
            .post(&self.credentials.url)
            .bearer_auth(&self.credentials.token)
            .json(&self.build_request(text))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("LLM response status: {}", status);
        if !status.is_success() {
            tracing::warn!("LLM service answered {}", status);
        }

        Ok(response.json::<ChatCompletionResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn llm_client(url: String) -> LlmClient {
        LlmClient::new(
            LlmCredentials {
                url,
                token: "llm-token".to_string(),
                system_prompt: "Classify the diet.".to_string(),
            },
            &ClassificationSection::default(),
        )
    }

    #[test]
    fn test_ocr_file_type() {
        assert_eq!(ocr_file_type(".png"), "PNG");
        assert_eq!(ocr_file_type(".jpeg"), "JPEG");
    }

    #[test]
    fn test_chat_request_shape() {
        let client = llm_client("http://localhost/v1/chat/completions".to_string());
        let body = serde_json::to_value(client.build_request("water, sugar")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "messages": [
                    {"role": "system", "content": "Classify the diet."},
                    {"role": "user", "content": "water, sugar"}
                ],
                "response_format": {"type": "json_object"},
                "temperature": 0.01,
                "max_tokens": 256,
                "frequency_penalty": 0.9,
                "presence_penalty": 0.9,
                "stream": false
            })
        );
    }

    #[tokio::test]
    async fn test_llm_client_sends_bearer_token() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer llm-token")
                .json_body_partial(r#"{"response_format": {"type": "json_object"}}"#);
            then.status(200).json_body(serde_json::json!({
                "choices": [{"message": {"content": "{}"}}]
            }));
        });

        let client = llm_client(server.url("/v1/chat/completions"));
        let response = client.complete("water").await.unwrap();

        api_mock.assert();
        assert_eq!(response.first_content().unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_ocr_client_sends_form_fields_and_api_key() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/parse/image")
                .header("apikey", "ocr-key")
                .body_contains("name=\"OCREngine\"")
                .body_contains("JPEG")
                .body_contains("filename=\"apple.jpeg\"");
            then.status(200).json_body(serde_json::json!({
                "ParsedResults": [{"ParsedText": "sugar"}]
            }));
        });

        let client = OcrClient::new(
            OcrCredentials {
                url: server.url("/parse/image"),
                api_key: "ocr-key".to_string(),
            },
            &OcrSection::default(),
        );
        let response = client
            .recognize(b"fake-jpeg".to_vec(), "apple.jpeg", ".jpeg")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(response.recognized_text().unwrap(), "sugar");
    }

    #[tokio::test]
    async fn test_error_status_is_still_decoded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401)
                .json_body(serde_json::json!({"error": {"message": "invalid token"}}));
        });

        let client = llm_client(server.url("/v1/chat/completions"));
        let response = client.complete("water").await.unwrap();

        assert!(response.first_content().is_err());
        assert!(response.error.is_some());
    }
}
