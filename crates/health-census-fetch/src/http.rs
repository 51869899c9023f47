//! HTTP retrieval of the reference dataset.

use async_trait::async_trait;
use health_census_core::models::ReferenceDataset;
use health_census_core::reference::{FetchError, FetchResult, ReferenceSource};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;

/// GETs the dataset document from a fixed URL.
pub struct HttpSource {
    url: String,
    client: Client,
}

impl HttpSource {
    /// Create a source. `timeout_seconds: None` leaves requests unbounded.
    pub fn new(url: impl Into<String>, timeout_seconds: Option<u64>) -> FetchResult<Self> {
        let mut builder = ClientBuilder::new();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReferenceSource for HttpSource {
    async fn fetch(&self) -> FetchResult<ReferenceDataset> {
        tracing::debug!(url = %self.url, "Fetching reference dataset");

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        match resp.status() {
            StatusCode::OK => {
                let body = resp
                    .text()
                    .await
                    .map_err(|e| FetchError::Http(e.to_string()))?;
                let dataset = ReferenceDataset::from_json(&body)?;
                tracing::debug!(
                    url = %self.url,
                    conditions = dataset.conditions.len(),
                    "Reference dataset fetched"
                );
                Ok(dataset)
            }
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(FetchError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
