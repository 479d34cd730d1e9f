//! Raster and vector source collaborators.
//!
//! [`SourceFetcher`] reads local paths, `file://` URLs and `http(s)://`
//! URLs. [`InMemorySource`] serves preloaded bytes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use elevation::{decode_geotiff, DecodedRaster, RasterSource};
use geo_common::{GeoError, GeoResult};
use reqwest::Client;
use tracing::{debug, instrument};
use vector_layer::{parse_document, VectorDocument, VectorSource};

/// Decode off the async runtime; GeoTIFF inflation can be slow.
async fn decode_raster(bytes: Bytes) -> GeoResult<DecodedRaster> {
    tokio::task::spawn_blocking(move || decode_geotiff(&bytes))
        .await
        .map_err(|e| GeoError::decode(format!("raster decode task failed: {}", e)))?
}

/// Fetches sources from the filesystem or over HTTP.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Client,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> GeoResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GeoError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Read the raw bytes behind `url`.
    #[instrument(skip(self))]
    pub async fn fetch_bytes(&self, url: &str) -> GeoResult<Bytes> {
        if url.starts_with("http://") || url.starts_with("https://") {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| GeoError::fetch(url, e.to_string()))?;
            let body = response
                .bytes()
                .await
                .map_err(|e| GeoError::fetch(url, e.to_string()))?;
            debug!(bytes = body.len(), "Fetched remote source");
            return Ok(body);
        }

        let path = url.strip_prefix("file://").unwrap_or(url);
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| GeoError::fetch(url, e.to_string()))?;
        debug!(bytes = data.len(), "Read local source");
        Ok(Bytes::from(data))
    }
}

#[async_trait]
impl RasterSource for SourceFetcher {
    async fn fetch_raster(&self, url: &str) -> GeoResult<DecodedRaster> {
        let bytes = self.fetch_bytes(url).await?;
        decode_raster(bytes).await
    }
}

#[async_trait]
impl VectorSource for SourceFetcher {
    async fn fetch_document(&self, url: &str) -> GeoResult<VectorDocument> {
        let bytes = self.fetch_bytes(url).await?;
        parse_document(&bytes)
    }
}

/// Serves sources from memory, keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    entries: HashMap<String, Bytes>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, data: impl Into<Bytes>) {
        self.entries.insert(url.into(), data.into());
    }

    pub fn with(mut self, url: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(url, data);
        self
    }

    fn get(&self, url: &str) -> GeoResult<Bytes> {
        self.entries
            .get(url)
            .cloned()
            .ok_or_else(|| GeoError::fetch(url, "not found"))
    }
}

#[async_trait]
impl RasterSource for InMemorySource {
    async fn fetch_raster(&self, url: &str) -> GeoResult<DecodedRaster> {
        decode_raster(self.get(url)?).await
    }
}

#[async_trait]
impl VectorSource for InMemorySource {
    async fn fetch_document(&self, url: &str) -> GeoResult<VectorDocument> {
        parse_document(&self.get(url)?)
    }
}
