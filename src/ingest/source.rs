use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("Object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("Object key is not a valid relative path: {0}")]
    InvalidKey(String),

    #[error("Object is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Read access to the object store that delivers weather files
#[async_trait]
pub trait ObjectSource: Send + Sync {
    async fn fetch_text(&self, bucket: &str, key: &str) -> Result<String, ObjectError>;
}

/// Buckets are directories under a root, keys are relative paths
pub struct LocalObjectSource {
    root: PathBuf,
}

impl LocalObjectSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, bucket: &str, key: &str) -> Result<PathBuf, ObjectError> {
        let relative = Path::new(bucket).join(key);
        if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(ObjectError::InvalidKey(format!("{}/{}", bucket, key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectSource for LocalObjectSource {
    async fn fetch_text(&self, bucket: &str, key: &str) -> Result<String, ObjectError> {
        let path = self.resolve(bucket, key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ObjectError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        String::from_utf8(bytes).map_err(|e| ObjectError::Encoding(e.to_string()))
    }
}

/// Path-style HTTP object store: `GET <endpoint>/<bucket>/<key>`
pub struct HttpObjectSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpObjectSource {
    pub fn new(endpoint: &str) -> Result<Self, ObjectError> {
        let mut endpoint = Url::parse(endpoint)?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<Url, ObjectError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(bucket)
            .extend(key.split('/'));
        Ok(url)
    }
}

#[async_trait]
impl ObjectSource for HttpObjectSource {
    async fn fetch_text(&self, bucket: &str, key: &str) -> Result<String, ObjectError> {
        let url = self.object_url(bucket, key)?;
        let response = self.client.get(url.clone()).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ObjectError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        let text = response.error_for_status()?.text().await?;
        debug!("Fetched {} bytes from {}", text.len(), url);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_source_reads_bucket_files() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("uploads/daily")).unwrap();
        std::fs::write(root.path().join("uploads/daily/a.csv"), "1,Sapporo,1,Clear,10\n").unwrap();

        let source = LocalObjectSource::new(root.path());
        let text = source.fetch_text("uploads", "daily/a.csv").await.unwrap();
        assert!(text.starts_with("1,Sapporo"));

        assert!(matches!(
            source.fetch_text("uploads", "missing.csv").await,
            Err(ObjectError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn local_source_rejects_escaping_keys() {
        let source = LocalObjectSource::new("/tmp");
        assert!(matches!(
            source.fetch_text("uploads", "../etc/passwd").await,
            Err(ObjectError::InvalidKey(_))
        ));
    }

    #[test]
    fn http_source_builds_path_style_urls() {
        let source = HttpObjectSource::new("http://objects.local:9000/store").unwrap();
        let url = source.object_url("uploads", "daily/weather data.csv").unwrap();
        assert_eq!(url.as_str(), "http://objects.local:9000/store/uploads/daily/weather%20data.csv");
    }
}
