use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::table::{AttributeValue, Item, TableError, WeatherTable, PARTITION_KEY, SORT_KEY, TTL_ATTRIBUTE};
use crate::models::{WeatherRecord, CITIES};

const CITY_NAME: &str = "CityName";
const WEATHER_ID: &str = "WeatherId";
const WEATHER_NAME: &str = "WeatherName";
const RAINFALL_PROBABILITY: &str = "RainfallProbability";

/// Store failures. Surfaced as `DB_ERROR` until the service wraps them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to save weather data for city {city_id}: {source}")]
    Save {
        city_id: i64,
        #[source]
        source: TableError,
    },

    #[error("Failed to fetch weather data for city {city_id}: {source}")]
    Fetch {
        city_id: i64,
        #[source]
        source: TableError,
    },

    #[error("Failed to fetch weather data for every city: {0:?}")]
    AllFailed(Vec<i64>),

    #[error("Stored item is malformed: {0}")]
    MalformedItem(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        "DB_ERROR"
    }
}

/// Typed access to the weather table
#[derive(Clone)]
pub struct WeatherStore {
    table: Arc<dyn WeatherTable>,
}

impl WeatherStore {
    pub fn new(table: Arc<dyn WeatherTable>) -> Self {
        Self { table }
    }

    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    pub async fn put(&self, record: &WeatherRecord) -> Result<(), StoreError> {
        self.table
            .put_item(to_item(record))
            .await
            .map_err(|source| {
                error!("Failed to save weather data for city {}: {}", record.city_id, source);
                StoreError::Save { city_id: record.city_id, source }
            })?;
        info!("Saved weather data for city {}", record.city_id);
        Ok(())
    }

    /// Write every record, tolerating individual failures
    pub async fn put_many(&self, records: &[WeatherRecord]) -> (usize, usize) {
        let mut success_count = 0;
        let mut error_count = 0;

        for record in records {
            match self.put(record).await {
                Ok(()) => success_count += 1,
                Err(_) => error_count += 1,
            }
        }

        (success_count, error_count)
    }

    pub async fn get_latest(&self, city_id: i64) -> Result<Option<WeatherRecord>, StoreError> {
        let items = self
            .table
            .query_partition(city_id, 1)
            .await
            .map_err(|source| StoreError::Fetch { city_id, source })?;

        items.first().map(from_item).transpose()
    }

    /// Latest record of every known city that has data. Fails only when no
    /// record was found and at least one lookup failed.
    pub async fn get_all_latest(&self) -> Result<Vec<WeatherRecord>, StoreError> {
        let mut results = Vec::new();
        let mut failed = Vec::new();

        for city in CITIES.iter() {
            match self.get_latest(city.id).await {
                Ok(Some(record)) => results.push(record),
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to get weather for city {}: {}", city.id, e);
                    failed.push(city.id);
                }
            }
        }

        if !failed.is_empty() && results.is_empty() {
            return Err(StoreError::AllFailed(failed));
        }

        Ok(results)
    }

    pub async fn health_check(&self) -> bool {
        match self.table.describe().await {
            Ok(()) => true,
            Err(e) => {
                error!("Database health check failed: {}", e);
                false
            }
        }
    }
}

fn number(value: i64) -> AttributeValue {
    AttributeValue::N(Decimal::from(value))
}

fn string(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

pub(crate) fn to_item(record: &WeatherRecord) -> Item {
    let mut item = Item::new();
    item.insert(PARTITION_KEY.to_string(), number(record.city_id));
    item.insert(CITY_NAME.to_string(), string(&record.city_name));
    if let Some(weather_id) = record.weather_id {
        item.insert(WEATHER_ID.to_string(), number(weather_id));
    }
    item.insert(WEATHER_NAME.to_string(), string(&record.weather_name));
    item.insert(
        RAINFALL_PROBABILITY.to_string(),
        number(i64::from(record.rainfall_probability)),
    );
    item.insert(SORT_KEY.to_string(), string(&record.timestamp));
    if let Some(ttl) = record.ttl {
        item.insert(TTL_ATTRIBUTE.to_string(), number(ttl));
    }
    item
}

pub(crate) fn from_item(item: &Item) -> Result<WeatherRecord, StoreError> {
    let integer = |name: &str| -> Result<Option<i64>, StoreError> {
        match item.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_decimal()
                .and_then(|n| n.trunc().to_i64())
                .map(Some)
                .ok_or_else(|| StoreError::MalformedItem(format!("{} is not an integer", name))),
        }
    };
    let required = |name: &str| -> Result<i64, StoreError> {
        integer(name)?.ok_or_else(|| StoreError::MalformedItem(format!("{} is missing", name)))
    };
    let text = |name: &str| -> Result<String, StoreError> {
        item.get(name)
            .and_then(AttributeValue::as_str)
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| StoreError::MalformedItem(format!("{} is missing or empty", name)))
    };

    let rainfall = required(RAINFALL_PROBABILITY)?;
    let rainfall_probability = u8::try_from(rainfall)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| StoreError::MalformedItem(format!("rainfall probability {} out of range", rainfall)))?;

    Ok(WeatherRecord {
        city_id: required(PARTITION_KEY)?,
        city_name: text(CITY_NAME)?,
        weather_id: integer(WEATHER_ID)?,
        weather_name: text(WEATHER_NAME)?,
        rainfall_probability,
        timestamp: text(SORT_KEY)?,
        ttl: integer(TTL_ATTRIBUTE)?,
    })
}
