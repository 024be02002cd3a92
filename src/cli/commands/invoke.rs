use std::path::Path;

use crate::app;
use crate::cli::utils::output_json;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::router::ApiRequest;

/// Feed a gateway event through the router and print the envelope
pub async fn handle(event: &Path, config: &AppConfig, _output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(event).await?;
    let request: ApiRequest = serde_json::from_str(&raw)?;

    let router = app::build_router(config).await?;
    let response = router.handle(request).await;
    output_json(&response)
}
