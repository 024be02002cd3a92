use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Partition key attribute
pub const PARTITION_KEY: &str = "CityId";
/// Sort key attribute
pub const SORT_KEY: &str = "timestamp";
/// Expiry attribute, epoch seconds
pub const TTL_ATTRIBUTE: &str = "ttl";

/// Attribute value as held by the key-value table. Numbers are exact decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(Decimal),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            AttributeValue::N(_) => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            AttributeValue::N(n) => Some(*n),
            AttributeValue::S(_) => None,
        }
    }
}

pub type Item = BTreeMap<String, AttributeValue>;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Item is missing key attribute: {0}")]
    MissingKey(&'static str),

    #[error("Key attribute {0} has the wrong type")]
    InvalidKey(&'static str),

    #[error("Table unavailable: {0}")]
    Unavailable(String),

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot format error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Key-value table keyed by (CityId, timestamp).
#[async_trait]
pub trait WeatherTable: Send + Sync {
    fn name(&self) -> &str;

    /// Insert or replace the item with the same composite key
    async fn put_item(&self, item: Item) -> Result<(), TableError>;

    /// Unexpired items of one partition, sorted by timestamp descending
    async fn query_partition(&self, city_id: i64, limit: usize) -> Result<Vec<Item>, TableError>;

    /// Fails when the table cannot be reached
    async fn describe(&self) -> Result<(), TableError>;
}

type Partitions = BTreeMap<i64, BTreeMap<String, Item>>;

/// In-process table with an optional JSON snapshot. With a snapshot, every
/// read and write starts from the file, so several processes can share one
/// data directory.
pub struct MemoryTable {
    name: String,
    snapshot: Option<PathBuf>,
    partitions: RwLock<Partitions>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            snapshot: None,
            partitions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Open a table persisted at `<dir>/<name>.json`, loading existing items
    pub async fn open(name: impl Into<String>, dir: &Path) -> Result<Self, TableError> {
        let name = name.into();
        let path = dir.join(format!("{}.json", name));

        let partitions = match load_snapshot(&path).await? {
            Some(partitions) => {
                info!("Loaded table {} from {}", name, path.display());
                partitions
            }
            None => {
                tokio::fs::create_dir_all(dir).await?;
                Partitions::new()
            }
        };

        Ok(Self {
            name,
            snapshot: Some(path),
            partitions: RwLock::new(partitions),
        })
    }

    /// Pick up writes made by other processes sharing the snapshot
    async fn refresh(&self, partitions: &mut Partitions) -> Result<(), TableError> {
        if let Some(path) = &self.snapshot {
            if let Some(loaded) = load_snapshot(path).await? {
                *partitions = loaded;
            }
        }
        Ok(())
    }

    /// Write the snapshot through a temporary file so readers never see a
    /// partial file
    async fn persist(&self, partitions: &Partitions) -> Result<(), TableError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let items: Vec<&Item> = partitions.values().flat_map(|p| p.values()).collect();
        let bytes = serde_json::to_vec(&items)?;

        let staging = path.with_extension(format!("json.{}.tmp", std::process::id()));
        tokio::fs::write(&staging, bytes).await?;
        if let Err(e) = tokio::fs::rename(&staging, path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        debug!("Wrote {} items to {}", items.len(), path.display());
        Ok(())
    }
}

#[async_trait]
impl WeatherTable for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put_item(&self, item: Item) -> Result<(), TableError> {
        let (city_id, timestamp) = composite_key(&item)?;
        let mut partitions = self.partitions.write().await;

        // Stage the write; memory changes only once the snapshot is on disk
        let mut staged = partitions.clone();
        self.refresh(&mut staged).await?;
        staged.entry(city_id).or_default().insert(timestamp, item);
        purge_expired(&mut staged, chrono::Utc::now().timestamp());

        self.persist(&staged).await?;
        *partitions = staged;
        Ok(())
    }

    async fn query_partition(&self, city_id: i64, limit: usize) -> Result<Vec<Item>, TableError> {
        let now = chrono::Utc::now().timestamp();
        let mut partitions = self.partitions.write().await;
        self.refresh(&mut partitions).await?;

        Ok(partitions
            .get(&city_id)
            .map(|partition| {
                partition
                    .values()
                    .rev()
                    .filter(|item| !is_expired(item, now))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn describe(&self) -> Result<(), TableError> {
        match &self.snapshot {
            Some(path) => match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => Err(
                    TableError::Unavailable(format!("data directory {} is missing", dir.display())),
                ),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }
}

/// Read a snapshot file; `None` when it does not exist yet
async fn load_snapshot(path: &Path) -> Result<Option<Partitions>, TableError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let items: Vec<Item> = serde_json::from_slice(&bytes)?;
    let mut partitions = Partitions::new();
    for item in items {
        let (city_id, timestamp) = composite_key(&item)?;
        partitions.entry(city_id).or_default().insert(timestamp, item);
    }
    purge_expired(&mut partitions, chrono::Utc::now().timestamp());
    Ok(Some(partitions))
}

/// Drop expired items and partitions left empty
fn purge_expired(partitions: &mut Partitions, now: i64) {
    for partition in partitions.values_mut() {
        partition.retain(|_, item| !is_expired(item, now));
    }
    partitions.retain(|_, partition| !partition.is_empty());
}

fn composite_key(item: &Item) -> Result<(i64, String), TableError> {
    use rust_decimal::prelude::ToPrimitive;

    let city_id = item
        .get(PARTITION_KEY)
        .ok_or(TableError::MissingKey(PARTITION_KEY))?
        .as_decimal()
        .and_then(|n| n.to_i64())
        .ok_or(TableError::InvalidKey(PARTITION_KEY))?;
    let timestamp = item
        .get(SORT_KEY)
        .ok_or(TableError::MissingKey(SORT_KEY))?
        .as_str()
        .ok_or(TableError::InvalidKey(SORT_KEY))?
        .to_string();
    Ok((city_id, timestamp))
}

fn is_expired(item: &Item, now: i64) -> bool {
    use rust_decimal::prelude::ToPrimitive;

    item.get(TTL_ATTRIBUTE)
        .and_then(AttributeValue::as_decimal)
        .and_then(|ttl| ttl.to_i64())
        .map(|ttl| ttl <= now)
        .unwrap_or(false)
}
