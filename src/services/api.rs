// src/services/api.rs

//! OpenF1 API client.
//!
//! Implements the bounded-retry, soft-failure fetch contract: a fetch either
//! yields the endpoint's record list or `None` after exhausting its attempts.
//! Transient failures are logged, never raised.

use std::time::Duration;

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::ApiConfig;

/// Client for the OpenF1 REST API.
pub struct OpenF1Client {
    config: ApiConfig,
    client: reqwest::Client,
}

impl OpenF1Client {
    /// Create a new client with the given configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// Fetch `endpoint` with the given query parameters.
    ///
    /// Performs up to `retries` attempts with a fixed delay in between. An
    /// attempt succeeds only on HTTP 200 with a JSON array body. Returns
    /// `None` after the last attempt fails; callers treat that as "no data"
    /// and degrade gracefully.
    pub async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Option<Vec<Value>> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        );
        let retries = self.config.retries.max(1);

        for attempt in 1..=retries {
            match self.try_fetch(endpoint, &url, params).await {
                Ok(rows) => return Some(rows),
                Err(e) => {
                    log::warn!("{endpoint} ({params:?}) attempt {attempt}/{retries}: {e}");
                }
            }

            if attempt < retries {
                tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
            }
        }

        log::error!("Could not fetch {endpoint} with params {params:?}");
        None
    }

    async fn try_fetch(
        &self,
        endpoint: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>> {
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AppError::api(endpoint, format!("status={status}")));
        }

        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            other => Err(AppError::api(
                endpoint,
                format!("expected a JSON array, got {}", type_name(&other)),
            )),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
