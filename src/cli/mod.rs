pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "weather")]
#[command(about = "Weather CLI - batch ingest and data operations for the weather API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Load delimited weather files into the table")]
    Ingest {
        #[command(subcommand)]
        cmd: commands::ingest::IngestCommands,
    },

    #[command(about = "Generate and inspect weather data")]
    Data {
        #[command(subcommand)]
        cmd: commands::data::DataCommands,
    },

    #[command(about = "Run a gateway event file through the API router")]
    Invoke {
        #[arg(help = "Path to a JSON gateway event")]
        event: std::path::PathBuf,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Ingest { cmd } => commands::ingest::handle(cmd, config, output_format).await,
        Commands::Data { cmd } => commands::data::handle(cmd, config, output_format).await,
        Commands::Invoke { event } => commands::invoke::handle(&event, config, output_format).await,
    }
}
