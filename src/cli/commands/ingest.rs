use clap::Subcommand;
use serde_json::Value;
use std::path::PathBuf;

use crate::app;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum IngestCommands {
    #[command(about = "Process a file-arrival notification event")]
    Event {
        #[arg(help = "Path to the JSON notification event")]
        path: PathBuf,
    },

    #[command(about = "Process one object directly")]
    File {
        #[arg(long, help = "Bucket (container) name")]
        bucket: String,
        #[arg(long, help = "Object key, unescaped")]
        key: String,
    },
}

pub async fn handle(cmd: IngestCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let service = app::build_service(config).await?;
    let ingestor = app::build_ingestor(config, &service)?;

    match cmd {
        IngestCommands::Event { path } => {
            let raw = tokio::fs::read_to_string(&path).await?;
            let event: Value = serde_json::from_str(&raw)?;
            let summary = ingestor.handle_event(&event).await;
            output_value(&output_format, &serde_json::to_value(summary)?)
        }
        IngestCommands::File { bucket, key } => {
            let summary = ingestor.process_file(&bucket, &key).await?;
            output_value(&output_format, &serde_json::to_value(summary)?)
        }
    }
}
