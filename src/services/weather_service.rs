use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{error, info};

use crate::database::{StoreError, WeatherStore};
use crate::models::catalog::{self, LookupEntry};
use crate::models::{batch_stamp, WeatherRecord, CITIES, DEFAULT_TTL_HOURS, WEATHER_TYPES};

/// Business-level failures, surfaced as `DATA_ERROR`
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Failed to generate weather data ({failed} writes failed)")]
    Generation { failed: usize },

    #[error("Failed to retrieve weather data: {0}")]
    Retrieval(#[source] StoreError),

    #[error("Failed to compute weather statistics: {0}")]
    Statistics(#[source] StoreError),

    #[error("Unknown city id: {0}")]
    UnknownCity(i64),
}

impl WeatherError {
    pub fn code(&self) -> &'static str {
        "DATA_ERROR"
    }
}

/// Aggregate view over the latest record of every city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherStatistics {
    pub total_cities: usize,
    pub data_available: usize,
    pub weather_distribution: BTreeMap<String, usize>,
    pub average_rainfall: f64,
}

impl WeatherStatistics {
    pub fn from_records(records: &[WeatherRecord]) -> Self {
        let mut weather_distribution = BTreeMap::new();
        let mut total_rainfall = 0u64;

        for record in records {
            *weather_distribution.entry(record.weather_name.clone()).or_insert(0) += 1;
            total_rainfall += u64::from(record.rainfall_probability);
        }

        let average_rainfall = if records.is_empty() {
            0.0
        } else {
            let mean = total_rainfall as f64 / records.len() as f64;
            (mean * 10.0).round() / 10.0
        };

        Self {
            total_cities: CITIES.len(),
            data_available: records.len(),
            weather_distribution,
            average_rainfall,
        }
    }
}

pub struct WeatherService {
    store: WeatherStore,
    ttl_hours: i64,
}

impl WeatherService {
    pub fn new(store: WeatherStore) -> Self {
        Self { store, ttl_hours: DEFAULT_TTL_HOURS }
    }

    pub fn with_ttl_hours(mut self, ttl_hours: i64) -> Self {
        self.ttl_hours = ttl_hours;
        self
    }

    pub fn store(&self) -> &WeatherStore {
        &self.store
    }

    /// Random reading for every city, sharing one timestamp and expiry
    pub fn generate_batch(&self) -> Vec<WeatherRecord> {
        let (timestamp, ttl) = batch_stamp(Utc::now(), self.ttl_hours);
        let mut rng = rand::thread_rng();

        CITIES
            .iter()
            .map(|city| {
                let weather = WEATHER_TYPES
                    .choose(&mut rng)
                    .unwrap_or(&WEATHER_TYPES[0]);
                let (low, high) = weather.rainfall_range;

                WeatherRecord {
                    city_id: city.id,
                    city_name: city.name.to_string(),
                    weather_id: Some(weather.id),
                    weather_name: weather.name.to_string(),
                    rainfall_probability: rng.gen_range(low..=high),
                    timestamp: timestamp.clone(),
                    ttl: Some(ttl),
                }
            })
            .collect()
    }

    /// Generate and store a reading for every city. Fails only if nothing was written.
    pub async fn generate_all(&self) -> Result<Vec<WeatherRecord>, WeatherError> {
        let records = self.generate_batch();
        let (success, failed) = self.store.put_many(&records).await;
        info!("Generated weather data: {} success, {} errors", success, failed);

        if success == 0 {
            return Err(WeatherError::Generation { failed });
        }
        Ok(records)
    }

    pub async fn get_current(&self) -> Result<Vec<WeatherRecord>, WeatherError> {
        self.store.get_all_latest().await.map_err(|e| {
            error!("Failed to get current weather: {}", e);
            WeatherError::Retrieval(e)
        })
    }

    /// Forecast view. Serves the latest readings until a forecast model exists.
    pub async fn get_forecast(&self) -> Result<Vec<WeatherRecord>, WeatherError> {
        self.get_current().await
    }

    pub async fn get_weather_by_city(&self, city_id: i64) -> Result<Option<WeatherRecord>, WeatherError> {
        if catalog::find_city(city_id).is_none() {
            return Err(WeatherError::UnknownCity(city_id));
        }

        self.store.get_latest(city_id).await.map_err(|e| {
            error!("Failed to get weather for city {}: {}", city_id, e);
            WeatherError::Retrieval(e)
        })
    }

    pub async fn get_statistics(&self) -> Result<WeatherStatistics, WeatherError> {
        let records = self.store.get_all_latest().await.map_err(|e| {
            error!("Failed to get statistics: {}", e);
            WeatherError::Statistics(e)
        })?;
        Ok(WeatherStatistics::from_records(&records))
    }

    pub fn get_weather_types() -> Vec<LookupEntry> {
        catalog::weather_type_entries()
    }

    pub fn get_cities() -> Vec<LookupEntry> {
        catalog::city_entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::find_weather_type;
    use crate::testing::{memory_service, service_over, FailingTable};
    use std::sync::Arc;

    fn record(city_id: i64, weather_name: &str, rainfall: u8) -> WeatherRecord {
        WeatherRecord {
            city_id,
            city_name: format!("city-{}", city_id),
            weather_id: None,
            weather_name: weather_name.to_string(),
            rainfall_probability: rainfall,
            timestamp: "T".to_string(),
            ttl: None,
        }
    }

    #[test]
    fn generated_batch_covers_every_city_within_type_ranges() {
        let service = memory_service();
        for _ in 0..50 {
            let batch = service.generate_batch();
            let ids: Vec<i64> = batch.iter().map(|r| r.city_id).collect();
            assert_eq!(ids, vec![1, 13, 23, 27, 40]);

            for record in &batch {
                let weather = find_weather_type(record.weather_id.unwrap()).unwrap();
                let (low, high) = weather.rainfall_range;
                assert_eq!(record.weather_name, weather.name);
                assert!((low..=high).contains(&record.rainfall_probability));
                assert_eq!(record.timestamp, batch[0].timestamp);
                assert_eq!(record.ttl, batch[0].ttl);
            }
        }
    }

    #[test]
    fn batch_expires_after_configured_hours() {
        let store = memory_service().store().clone();
        let service = WeatherService::new(store).with_ttl_hours(1);
        let now = Utc::now().timestamp();
        let ttl = service.generate_batch()[0].ttl.unwrap();
        assert!((now + 3600 - 5..=now + 3600 + 5).contains(&ttl));
    }

    #[tokio::test]
    async fn generate_all_writes_five_records() {
        let service = memory_service();
        assert_eq!(service.generate_all().await.unwrap().len(), 5);
        assert_eq!(service.get_current().await.unwrap().len(), 5);
        assert_eq!(service.get_forecast().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn generate_all_tolerates_partial_write_failures() {
        let service = service_over(Arc::new(FailingTable::cities(&[1, 13])));
        assert_eq!(service.generate_all().await.unwrap().len(), 5);
        assert_eq!(service.get_current().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn generate_all_fails_when_nothing_is_written() {
        let service = service_over(Arc::new(FailingTable::all()));
        let err = service.generate_all().await.unwrap_err();
        assert!(matches!(err, WeatherError::Generation { failed: 5 }));
        assert_eq!(err.code(), "DATA_ERROR");
    }

    #[tokio::test]
    async fn statistics_on_empty_store_are_zeroed() {
        let stats = memory_service().get_statistics().await.unwrap();
        assert_eq!(stats.total_cities, 5);
        assert_eq!(stats.data_available, 0);
        assert!(stats.weather_distribution.is_empty());
        assert_eq!(stats.average_rainfall, 0.0);
    }

    #[test]
    fn statistics_count_types_and_round_mean() {
        let stats = WeatherStatistics::from_records(&[
            record(1, "Clear", 10),
            record(13, "Rain", 55),
            record(23, "Clear", 0),
        ]);
        assert_eq!(stats.data_available, 3);
        assert_eq!(stats.weather_distribution["Clear"], 2);
        assert_eq!(stats.weather_distribution["Rain"], 1);
        assert_eq!(stats.average_rainfall, 21.7);
    }

    #[tokio::test]
    async fn statistics_surface_store_failures() {
        let service = service_over(Arc::new(FailingTable::all()));
        assert!(matches!(
            service.get_statistics().await,
            Err(WeatherError::Statistics(StoreError::AllFailed(_)))
        ));
    }

    #[tokio::test]
    async fn city_lookup_rejects_unknown_ids() {
        let service = memory_service();
        assert!(matches!(
            service.get_weather_by_city(99).await,
            Err(WeatherError::UnknownCity(99))
        ));
        assert!(service.get_weather_by_city(27).await.unwrap().is_none());
    }

    #[test]
    fn lookup_tables_are_listed() {
        assert_eq!(WeatherService::get_weather_types().len(), 3);
        assert_eq!(WeatherService::get_cities().len(), 5);
    }
}
