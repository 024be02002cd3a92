// Startup wiring: config in, shared components out

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{MemoryTable, WeatherStore, WeatherTable};
use crate::ingest::{BatchIngestor, HttpObjectSource, LocalObjectSource, ObjectSource};
use crate::router::ApiRouter;
use crate::services::WeatherService;

pub async fn open_table(config: &AppConfig) -> anyhow::Result<Arc<dyn WeatherTable>> {
    let name = config.table.table_name.clone();
    let table = match &config.table.data_dir {
        Some(dir) => MemoryTable::open(name, dir)
            .await
            .with_context(|| format!("failed to open table in {}", dir.display()))?,
        None => MemoryTable::new(name),
    };
    info!("Using table {}", table.name());
    Ok(Arc::new(table))
}

pub async fn build_service(config: &AppConfig) -> anyhow::Result<Arc<WeatherService>> {
    let store = WeatherStore::new(open_table(config).await?);
    let service = WeatherService::new(store).with_ttl_hours(config.table.record_ttl_hours);
    Ok(Arc::new(service))
}

pub async fn build_router(config: &AppConfig) -> anyhow::Result<ApiRouter> {
    Ok(ApiRouter::new(build_service(config).await?))
}

pub fn build_object_source(config: &AppConfig) -> anyhow::Result<Arc<dyn ObjectSource>> {
    match &config.ingest.object_endpoint {
        Some(endpoint) => {
            let source = HttpObjectSource::new(endpoint)
                .with_context(|| format!("invalid object store endpoint {}", endpoint))?;
            Ok(Arc::new(source))
        }
        None => Ok(Arc::new(LocalObjectSource::new(config.ingest.object_root.clone()))),
    }
}

pub fn build_ingestor(config: &AppConfig, service: &WeatherService) -> anyhow::Result<BatchIngestor> {
    let source = build_object_source(config)?;
    Ok(BatchIngestor::new(source, service.store().clone()).with_ttl_hours(config.table.record_ttl_hours))
}
