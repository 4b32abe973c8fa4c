use anyhow::Result;
use grocery_scan::config::ClassificationSection;
use grocery_scan::domain::model::{ClassificationRecord, SkipReason};
use grocery_scan::{BatchRunner, ClassificationProcessor, LlmClient, LlmCredentials, LocalStorage};
use httpmock::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn classification_runner(
    temp_dir: &TempDir,
    url: String,
) -> (
    BatchRunner<LocalStorage>,
    ClassificationProcessor<LocalStorage>,
) {
    let storage = LocalStorage::new(temp_dir.path());
    let client = LlmClient::new(
        LlmCredentials {
            url,
            token: "llm-token".to_string(),
            system_prompt: "Answer with diet, groceryType and dietReason as JSON.".to_string(),
        },
        &ClassificationSection::default(),
    );
    (
        BatchRunner::new(storage.clone()),
        ClassificationProcessor::new(storage, client),
    )
}

fn seed_texts(temp_dir: &TempDir, files: &[(&str, &str)]) {
    let input = temp_dir.path().join("ocr-output");
    std::fs::create_dir_all(&input).unwrap();
    for (name, text) in files {
        std::fs::write(input.join(name), text).unwrap();
    }
}

fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

async fn run_batch(temp_dir: &TempDir, url: String) -> Result<grocery_scan::core::BatchSummary> {
    let (runner, processor) = classification_runner(temp_dir, url);
    let summary = runner
        .run(
            Path::new("ocr-output"),
            Path::new("classification-output"),
            &ClassificationSection::default().extensions,
            &processor,
        )
        .await?;
    Ok(summary)
}

#[tokio::test]
async fn test_record_extracted_from_chatty_reply() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_texts(&temp_dir, &[("syrup.txt", "water, sugar")]);

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer llm-token")
            .body_contains("water, sugar");
        then.status(200).json_body(chat_reply(
            r#"Here you go: {"diet":"vegan","groceryType":"syrup","dietReason":"no animal ingredients"} thanks"#,
        ));
    });

    let summary = run_batch(&temp_dir, server.url("/v1/chat/completions")).await?;

    api_mock.assert();
    assert_eq!(summary.written.len(), 1);

    let written = std::fs::read_to_string(
        temp_dir.path().join("classification-output/syrup.json"),
    )?;
    let value: serde_json::Value = serde_json::from_str(&written)?;
    assert_eq!(
        value,
        serde_json::json!({
            "diet": "vegan",
            "groceryType": "syrup",
            "dietReason": "no animal ingredients"
        })
    );

    let record: ClassificationRecord = serde_json::from_str(&written)?;
    assert_eq!(record.summary_line(), "🥬 syrup: no animal ingredients");
    Ok(())
}

#[tokio::test]
async fn test_reply_without_braces_is_skipped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_texts(&temp_dir, &[("smudge.txt", "illegible")]);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .json_body(chat_reply("Sorry, I cannot read these ingredients."));
    });

    let summary = run_batch(&temp_dir, server.url("/v1/chat/completions")).await?;

    assert!(summary.written.is_empty());
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].1, SkipReason::NoJsonObject);
    assert!(!temp_dir
        .path()
        .join("classification-output/smudge.json")
        .exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_choices_is_skipped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_texts(&temp_dir, &[("milk.txt", "milk")]);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(429)
            .json_body(serde_json::json!({"error": {"message": "rate limited"}}));
    });

    let summary = run_batch(&temp_dir, server.url("/v1/chat/completions")).await?;

    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].1, SkipReason::MissingChoices);
    Ok(())
}

#[tokio::test]
async fn test_one_bad_reply_does_not_stop_the_others() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_texts(
        &temp_dir,
        &[
            ("a-cheese.txt", "milk, salt, rennet"),
            ("b-broken.txt", "BROKEN"),
            ("c-bread.txt", "flour, water, yeast"),
            ("d-image.png", "not a text input"),
        ],
    );

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("rennet");
        then.status(200).json_body(chat_reply(
            "{\\n\"diet\": \"nicht vegan\",\\n\"groceryType\": \"cheese\",\\n\"dietReason\": \"milk\"\\n}",
        ));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("BROKEN");
        then.status(200)
            .json_body(chat_reply(r#"{"diet": "vegan", "groceryType": } oops"#));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("yeast");
        then.status(200).json_body(chat_reply(
            r#"{"diet":"vegan","groceryType":"bread","dietReason":"plant based"}"#,
        ));
    });

    let summary = run_batch(&temp_dir, server.url("/v1/chat/completions")).await?;

    assert_eq!(summary.attempted(), 3);
    assert_eq!(summary.written.len(), 2);
    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].0.ends_with("b-broken.txt"));
    assert!(matches!(summary.skipped[0].1, SkipReason::InvalidJson(_)));

    let cheese: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(
        temp_dir.path().join("classification-output/a-cheese.json"),
    )?)?;
    assert_eq!(cheese["diet"], "nicht vegan");
    assert!(temp_dir
        .path()
        .join("classification-output/c-bread.json")
        .exists());
    Ok(())
}

#[tokio::test]
async fn test_rerun_overwrites_previous_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_texts(&temp_dir, &[("tea.txt", "black tea")]);
    let output_dir = temp_dir.path().join("classification-output");
    std::fs::create_dir_all(&output_dir)?;
    std::fs::write(output_dir.join("tea.json"), "stale content from an older run")?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(chat_reply(
            r#"{"diet":"vegan","groceryType":"tea","dietReason":"tea leaves"}"#,
        ));
    });

    run_batch(&temp_dir, server.url("/v1/chat/completions")).await?;

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join("tea.json"))?)?;
    assert_eq!(value["groceryType"], "tea");
    Ok(())
}
