// Seed document sources: local file or HTTP
use crate::application::seed_source::{SeedError, SeedSource};
use crate::domain::telemetry::TelemetryTree;
use crate::infrastructure::config::SeedSettings;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FileSeedSource {
    path: PathBuf,
}

impl FileSeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeedSource for FileSeedSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<TelemetryTree, SeedError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SeedError::Io {
                path: self.describe(),
                source,
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Debug, Clone)]
pub struct HttpSeedSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSeedSource {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SeedSource for HttpSeedSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn load(&self) -> Result<TelemetryTree, SeedError> {
        let http_error = |source| SeedError::Http {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(http_error)?;

        if !response.status().is_success() {
            return Err(SeedError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(http_error)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

pub fn seed_source_from(settings: &SeedSettings) -> Arc<dyn SeedSource> {
    match &settings.url {
        Some(url) => Arc::new(HttpSeedSource::new(url.clone())),
        None => Arc::new(FileSeedSource::new(&settings.path)),
    }
}
