use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::models::WeatherRecord;

/// Print a value as pretty JSON
pub fn output_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Output weather records in the appropriate format
pub fn output_records(output_format: &OutputFormat, records: &[WeatherRecord]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(&records)?,
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No weather data available");
            }
            for record in records {
                println!(
                    "{:>3} {:<10} {:<8} {:>3}%  {}",
                    record.city_id,
                    record.city_name,
                    record.weather_name,
                    record.rainfall_probability,
                    record.timestamp
                );
            }
        }
    }
    Ok(())
}

/// Output a JSON document, or `key: value` lines for flat objects in text mode
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match (output_format, value.as_object()) {
        (OutputFormat::Text, Some(map)) => {
            for (key, item) in map {
                match item {
                    Value::String(s) => println!("{}: {}", key, s),
                    other => println!("{}: {}", key, other),
                }
            }
            Ok(())
        }
        _ => output_json(value),
    }
}
