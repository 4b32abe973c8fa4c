use crate::config::toml_config::ScanConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "grocery-scan")]
#[command(about = "Recognize grocery ingredient images and classify their diet")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    /// Path to the TOML tuning file (defaults to ./grocery-scan.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Recognize text from images in the OCR input folder
    Ocr(DirArgs),
    /// Classify recognized ingredient texts with the LLM
    Classify(DirArgs),
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct DirArgs {
    /// Overrides the configured input directory
    #[arg(long)]
    pub input_dir: Option<String>,

    /// Overrides the configured output directory
    #[arg(long)]
    pub output_dir: Option<String>,
}

impl CliConfig {
    /// 應用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut ScanConfig) {
        let (args, input_dir, output_dir) = match &self.command {
            Command::Ocr(args) => (
                args,
                &mut config.ocr.input_dir,
                &mut config.ocr.output_dir,
            ),
            Command::Classify(args) => (
                args,
                &mut config.classification.input_dir,
                &mut config.classification.output_dir,
            ),
        };

        if let Some(dir) = &args.input_dir {
            tracing::info!("🔧 Input directory overridden to: {}", dir);
            *input_dir = dir.clone();
        }
        if let Some(dir) = &args.output_dir {
            tracing::info!("🔧 Output directory overridden to: {}", dir);
            *output_dir = dir.clone();
        }
    }
}
