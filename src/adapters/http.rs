//! HTTP dataset source.
//!
//! One unauthenticated GET. Any non-2xx status is fatal; there is no retry.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use super::DatasetSource;

/// Dataset fetched from a fixed URL
pub struct HttpSource {
    /// Dataset URL
    url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a new source for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to download dataset from {}", self.url))?
            .error_for_status()
            .with_context(|| format!("Dataset download rejected: {}", self.url))?;

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read dataset body from {}", self.url))?;

        info!(
            operation = "dataset.fetch",
            status = "success",
            url = %self.url,
            size_bytes = bytes.len(),
            "dataset downloaded"
        );

        Ok(bytes.to_vec())
    }
}

/// Fetch from `source` and write the bytes to `path`
pub async fn download_dataset(source: &dyn DatasetSource, path: &Path) -> Result<()> {
    let bytes = source.fetch().await?;

    tokio::fs::write(path, &bytes)
        .await
        .with_context(|| format!("Failed to write dataset: {}", path.display()))?;

    Ok(())
}
