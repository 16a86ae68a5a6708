use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::api::transport::Transport;
use crate::app::ClientConfig;
use crate::error::{Error, Result};

/// Configured HTTP client instance.
///
/// Every request issued through it carries the configured timeout and
/// default headers. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Builds the client. Nothing touches the network here; the only
    /// failures are an invalid config, headers that are not legal HTTP or a
    /// TLS backend that cannot initialize.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let headers = Self::create_headers(config)?;
        let timeout = config.timeout();

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn create_headers(config: &ClientConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        for (name, value) in &config.default_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::validation(format!("Invalid header name {:?}: {}", name, e)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| Error::validation(format!("Invalid value for header {}: {}", name, e)))?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Request target for `path`. Without a base URL this is the path
    /// itself, i.e. a same-origin relative reference.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_body(method: &str, url: &str, start_time: Instant, response: Response) -> Result<Value> {
        let status = response.status();
        debug!("{} {} completed with {} in {:?}", method, url, status, start_time.elapsed());

        if !status.is_success() {
            warn!("{} {} returned {}", method, url, status);
        }
        let response = response.error_for_status()?;

        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(Value::Null);
        }

        // Non-JSON success bodies come back as text.
        match serde_json::from_slice(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!("{} {} body is not JSON ({}), returning it as text", method, url, e);
                Ok(Value::String(String::from_utf8_lossy(&body).into_owned()))
            }
        }
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {}", url);

        let start_time = Instant::now();
        let response = self.client.get(&url).send().await?;

        Self::read_body("GET", &url, start_time, response).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.url(path);
        debug!("POST {}", url);

        let start_time = Instant::now();
        let response = self.client.post(&url).json(body).send().await?;

        Self::read_body("POST", &url, start_time, response).await
    }
}
