use anyhow::Context;
use clap::Parser;
use grocery_scan::config::Command;
use grocery_scan::domain::model::BatchSummary;
use grocery_scan::utils::error::{ErrorSeverity, ScanError};
use grocery_scan::utils::{logger, validation::Validate};
use grocery_scan::{
    BatchRunner, ClassificationProcessor, CliConfig, LlmClient, LlmCredentials, LocalStorage,
    OcrClient, OcrCredentials, OcrProcessor, ScanConfig,
};
use std::path::Path;

fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }
}

fn exit_with(e: &ScanError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let mut config = match ScanConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    cli.apply_overrides(&mut config);
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let storage = LocalStorage::new(".");
    let runner = BatchRunner::new(storage.clone());

    let result = match &cli.command {
        Command::Ocr(_) => {
            // 憑證在任何批次工作之前檢查
            let credentials = OcrCredentials::from_env().unwrap_or_else(|e| exit_with(&e));
            let section = &config.ocr;
            let processor = OcrProcessor::new(storage, OcrClient::new(credentials, section));
            runner
                .run(
                    Path::new(&section.input_dir),
                    Path::new(&section.output_dir),
                    &section.extensions,
                    &processor,
                )
                .await
        }
        Command::Classify(_) => {
            // 憑證在任何批次工作之前檢查
            let credentials = LlmCredentials::from_env().unwrap_or_else(|e| exit_with(&e));
            let section = &config.classification;
            let processor =
                ClassificationProcessor::new(storage, LlmClient::new(credentials, section));
            runner
                .run(
                    Path::new(&section.input_dir),
                    Path::new(&section.output_dir),
                    &section.extensions,
                    &processor,
                )
                .await
        }
    };

    let summary: BatchSummary = match result {
        Ok(summary) => summary,
        Err(e) => exit_with(&e),
    };

    for (path, reason) in &summary.skipped {
        tracing::warn!("⚠️  {} skipped: {}", path.display(), reason);
    }
    for (path, message) in &summary.failed {
        tracing::warn!("⚠️  {} failed: {}", path.display(), message);
    }
    println!("{}", summary);

    std::io::Write::flush(&mut std::io::stdout()).context("failed to flush stdout")?;
    Ok(())
}
