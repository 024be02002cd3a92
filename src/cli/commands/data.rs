use clap::Subcommand;

use crate::app;
use crate::cli::utils::{output_json, output_records, output_value};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::services::WeatherService;

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "Generate a random reading for every city")]
    Generate,

    #[command(about = "Show the latest reading of every city")]
    Current,

    #[command(about = "Show the forecast view")]
    Forecast,

    #[command(about = "Show the latest reading of one city")]
    City {
        #[arg(help = "City id")]
        id: i64,
    },

    #[command(about = "Show weather statistics")]
    Stats,

    #[command(about = "List known cities")]
    Cities,

    #[command(about = "List weather types")]
    Types,
}

pub async fn handle(cmd: DataCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let service = app::build_service(config).await?;

    match cmd {
        DataCommands::Generate => {
            let records = service.generate_all().await?;
            output_records(&output_format, &records)
        }
        DataCommands::Current => output_records(&output_format, &service.get_current().await?),
        DataCommands::Forecast => output_records(&output_format, &service.get_forecast().await?),
        DataCommands::City { id } => match service.get_weather_by_city(id).await? {
            Some(record) => output_records(&output_format, &[record]),
            None => output_records(&output_format, &[]),
        },
        DataCommands::Stats => {
            let statistics = service.get_statistics().await?;
            output_value(&output_format, &serde_json::to_value(statistics)?)
        }
        DataCommands::Cities => output_json(&WeatherService::get_cities()),
        DataCommands::Types => output_json(&WeatherService::get_weather_types()),
    }
}
