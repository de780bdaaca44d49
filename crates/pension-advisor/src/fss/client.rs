//! Live FSS OpenAPI Client

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{Endpoint, PensionSource, RecordSet, SourceError, SourceQuery};

/// Client configuration
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// API base URL (no trailing slash)
    pub base_url: String,

    /// Service access key, appended to every call
    pub service_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.fss.or.kr/openapi/api".into(),
            service_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("FSS_BASE_URL")
            .unwrap_or_else(|_| "https://www.fss.or.kr/openapi/api".into())
            .trim_end_matches('/')
            .to_string();
        let service_key = std::env::var("FSS_SERVICE_KEY").unwrap_or_default();

        Self {
            base_url,
            service_key,
            ..Default::default()
        }
    }
}

/// Reqwest-backed source against the live OpenAPI.
///
/// The inner client pools connections, so one instance shared behind an
/// `Arc` supports concurrent requests.
pub struct FssClient {
    client: reqwest::Client,
    config: SourceConfig,
}

impl FssClient {
    pub fn from_config(config: SourceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    pub fn from_env() -> Self {
        Self::from_config(SourceConfig::from_env())
    }

    /// Whether a service key is configured
    pub fn is_configured(&self) -> bool {
        !self.config.service_key.is_empty()
    }
}

#[async_trait]
impl PensionSource for FssClient {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        query: &SourceQuery,
    ) -> Result<RecordSet, SourceError> {
        let url = format!("{}/{}", self.config.base_url, endpoint.path());

        let mut params = vec![("key", self.config.service_key.clone())];
        params.extend(query.to_params());

        // Log the path only; the query string carries the access key
        tracing::info!(path = endpoint.path(), "FSS request");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        let set = RecordSet::from_value(&body)?;
        tracing::info!(path = endpoint.path(), count = set.count, "FSS response");

        Ok(set)
    }

    fn name(&self) -> &str {
        "FSS OpenAPI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SourceConfig::default();
        assert_eq!(config.base_url, "https://www.fss.or.kr/openapi/api");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_unconfigured_client() {
        let client = FssClient::from_config(SourceConfig::default());
        assert!(!client.is_configured());
    }
}
