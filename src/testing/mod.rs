use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::database::table::{Item, MemoryTable, TableError, WeatherTable};
use crate::database::WeatherStore;
use crate::router::ApiRequest;
use crate::services::WeatherService;

/// Table double that fails reads and writes for selected cities
pub struct FailingTable {
    /// `None` fails every city
    failing: Option<Vec<i64>>,
    inner: MemoryTable,
}

impl FailingTable {
    pub fn all() -> Self {
        Self { failing: None, inner: MemoryTable::new("failing") }
    }

    pub fn cities(ids: &[i64]) -> Self {
        Self { failing: Some(ids.to_vec()), inner: MemoryTable::new("failing") }
    }

    /// Insert an item bypassing the failure rules
    pub async fn seed(&self, item: Item) {
        self.inner.put_item(item).await.expect("seed item");
    }

    fn fails_for(&self, city_id: i64) -> bool {
        self.failing.as_ref().map_or(true, |ids| ids.contains(&city_id))
    }
}

#[async_trait]
impl WeatherTable for FailingTable {
    fn name(&self) -> &str {
        "failing"
    }

    async fn put_item(&self, item: Item) -> Result<(), TableError> {
        let city_id = crate::database::store::from_item(&item).map(|r| r.city_id).unwrap_or(0);
        if self.fails_for(city_id) {
            return Err(TableError::Unavailable(format!("city {} rejected", city_id)));
        }
        self.inner.put_item(item).await
    }

    async fn query_partition(&self, city_id: i64, limit: usize) -> Result<Vec<Item>, TableError> {
        if self.fails_for(city_id) {
            return Err(TableError::Unavailable(format!("city {} unreachable", city_id)));
        }
        self.inner.query_partition(city_id, limit).await
    }

    async fn describe(&self) -> Result<(), TableError> {
        match self.failing {
            None => Err(TableError::Unavailable("table offline".to_string())),
            Some(_) => Ok(()),
        }
    }
}

pub fn memory_service() -> Arc<WeatherService> {
    let table = Arc::new(MemoryTable::new("weather-data"));
    Arc::new(WeatherService::new(WeatherStore::new(table)))
}

pub fn service_over(table: Arc<dyn WeatherTable>) -> Arc<WeatherService> {
    Arc::new(WeatherService::new(WeatherStore::new(table)))
}

pub fn sample_claims() -> Value {
    json!({
        "sub": "3f1c2a9e",
        "email": "forecaster@example.com",
        "cognito:username": "forecaster"
    })
}

/// Request carrying no authorizer data
pub fn request(method: &str, path: &str) -> ApiRequest {
    ApiRequest {
        http_method: method.to_string(),
        path: path.to_string(),
        request_id: Some("req-test".to_string()),
        ..Default::default()
    }
}

/// Request authorized through the REST-style `authorizer.claims` shape
pub fn authed_request(method: &str, path: &str) -> ApiRequest {
    ApiRequest {
        request_context: json!({ "authorizer": { "claims": sample_claims() } }),
        ..request(method, path)
    }
}
