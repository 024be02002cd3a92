use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::source::{ObjectError, ObjectSource};
use super::validator;
use crate::database::WeatherStore;
use crate::models::{batch_stamp, DEFAULT_TTL_HOURS};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Malformed notification: {0}")]
    Notification(#[from] serde_json::Error),

    #[error("Object key is not valid percent-encoding: {0}")]
    KeyEncoding(String),

    #[error("Failed to read object: {0}")]
    Object(#[from] ObjectError),
}

/// File-arrival notification, `{"s3": {"bucket": {"name"}, "object": {"key"}}}`
#[derive(Debug, Deserialize)]
pub struct ObjectNotification {
    #[serde(rename = "s3")]
    pub object_store: ObjectLocation,
}

#[derive(Debug, Deserialize)]
pub struct ObjectLocation {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ObjectRef {
    /// URL-escaped, `+` for spaces
    pub key: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub success_count: usize,
    pub error_count: usize,
}

impl IngestSummary {
    fn absorb(&mut self, other: IngestSummary) {
        self.success_count += other.success_count;
        self.error_count += other.error_count;
    }

    /// Invocation result reported back to the trigger
    pub fn to_result(&self) -> Value {
        json!({
            "statusCode": 200,
            "body": {
                "message": "CSV processing complete",
                "success_count": self.success_count,
                "error_count": self.error_count,
            }
        })
    }
}

/// Decode an escaped object key: `+` becomes a space, then percent-decoding
pub fn unescape_key(key: &str) -> Result<String, IngestError> {
    let spaced = key.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| IngestError::KeyEncoding(e.to_string()))
}

pub struct BatchIngestor {
    source: Arc<dyn ObjectSource>,
    store: WeatherStore,
    ttl_hours: i64,
}

impl BatchIngestor {
    pub fn new(source: Arc<dyn ObjectSource>, store: WeatherStore) -> Self {
        Self {
            source,
            store,
            ttl_hours: DEFAULT_TTL_HOURS,
        }
    }

    pub fn with_ttl_hours(mut self, ttl_hours: i64) -> Self {
        self.ttl_hours = ttl_hours;
        self
    }

    /// Process every notification of an event. Never fails: a bad
    /// notification or unreadable file counts as one error.
    pub async fn handle_event(&self, event: &Value) -> IngestSummary {
        let notifications = event
            .get("Records")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        info!("Received {} notifications", notifications.len());

        let mut summary = IngestSummary::default();
        for notification in notifications {
            match self.handle_notification(notification).await {
                Ok(file_summary) => summary.absorb(file_summary),
                Err(e) => {
                    error!("Error processing notification: {}", e);
                    summary.error_count += 1;
                }
            }
        }

        info!(
            "Processing result: {} success, {} errors",
            summary.success_count, summary.error_count
        );
        summary
    }

    async fn handle_notification(&self, notification: Value) -> Result<IngestSummary, IngestError> {
        let notification: ObjectNotification = serde_json::from_value(notification)?;
        let bucket = notification.object_store.bucket.name;
        let key = unescape_key(&notification.object_store.object.key)?;
        self.process_file(&bucket, &key).await
    }

    /// Validate and store every row of one file
    pub async fn process_file(&self, bucket: &str, key: &str) -> Result<IngestSummary, IngestError> {
        info!("Processing file: {}/{}", bucket, key);
        let content = self.source.fetch_text(bucket, key).await?;
        let (timestamp, ttl) = batch_stamp(Utc::now(), self.ttl_hours);

        let mut summary = IngestSummary::default();
        let mut reader = validator::row_reader(content.as_bytes());
        for (index, row) in reader.records().enumerate() {
            let row_num = index + 1;
            let parsed = match row {
                Ok(row) => validator::parse_row(&row.iter().collect::<Vec<_>>(), &timestamp, ttl),
                Err(e) => {
                    warn!("Row {}: {}", row_num, e);
                    None
                }
            };
            let Some(record) = parsed else {
                warn!("Row {}: invalid format, skipping", row_num);
                summary.error_count += 1;
                continue;
            };

            match self.store.put(&record).await {
                Ok(()) => summary.success_count += 1,
                Err(e) => {
                    error!("Row {}: {}", row_num, e);
                    summary.error_count += 1;
                }
            }
        }

        Ok(summary)
    }
}
