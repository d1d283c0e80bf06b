use super::{config_str, config_string_map, config_u64};
use crate::domain::model::{AgentConfig, Payload};
use crate::domain::ports::Agent;
use crate::utils::error::{HubError, Result};
use crate::utils::validation::{
    validate_one_of, validate_positive_number, validate_required_field, validate_url,
};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// 將 payload 送到外部 HTTP API，並把回應併回 payload
#[derive(Debug, Clone)]
pub struct HttpAgent {
    client: Client,
    endpoint: String,
    method: Method,
    headers: Vec<(String, String)>,
    retry_attempts: u32,
    retry_delay: Duration,
    response_field: Option<String>,
}

impl HttpAgent {
    pub const NAME: &'static str = "HttpAgent";

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let endpoint = config_str(Self::NAME, config, "endpoint")?;
        let endpoint = *validate_required_field("endpoint", &endpoint)?;
        validate_url("endpoint", endpoint)?;

        let method = config_str(Self::NAME, config, "method")?.unwrap_or("POST");
        validate_one_of("method", method, &["GET", "POST"])?;
        let method = if method.eq_ignore_ascii_case("GET") {
            Method::GET
        } else {
            Method::POST
        };

        let timeout_seconds =
            config_u64(Self::NAME, config, "timeout_seconds")?.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        validate_positive_number("timeout_seconds", timeout_seconds, 1)?;

        let retry_attempts = config_u64(Self::NAME, config, "retry_attempts")?.unwrap_or(0);
        let retry_attempts = u32::try_from(retry_attempts)
            .map_err(|_| HubError::agent_config(Self::NAME, "`retry_attempts` is too large"))?;
        let retry_delay_ms =
            config_u64(Self::NAME, config, "retry_delay_ms")?.unwrap_or(DEFAULT_RETRY_DELAY_MS);

        let headers = config_string_map(Self::NAME, config, "headers")?.unwrap_or_default();
        let response_field = config_str(Self::NAME, config, "response_field")?.map(str::to_string);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            method,
            headers,
            retry_attempts,
            retry_delay: Duration::from_millis(retry_delay_ms),
            response_field,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(&self, payload: &Payload) -> reqwest::RequestBuilder {
        let mut request = self.client.request(self.method.clone(), &self.endpoint);

        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        if self.method == Method::GET {
            // 只有純量欄位能放進 query string
            let query: Vec<(&str, String)> = payload
                .iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => Some((k.as_str(), s.clone())),
                    Value::Number(n) => Some((k.as_str(), n.to_string())),
                    Value::Bool(b) => Some((k.as_str(), b.to_string())),
                    _ => None,
                })
                .collect();
            request.query(&query)
        } else {
            request.json(payload)
        }
    }

    async fn send_once(&self, payload: &Payload) -> std::result::Result<Value, Attempt> {
        let response = self
            .build_request(payload)
            .send()
            .await
            .map_err(|e| Attempt::Retryable(HubError::HttpError(e)))?;

        let status = response.status();
        tracing::debug!("{} {} -> {}", self.method, self.endpoint, status);

        if status.is_server_error() {
            return Err(Attempt::Retryable(HubError::agent(
                Self::NAME,
                format!("server returned {}", status),
            )));
        }
        if !status.is_success() {
            return Err(Attempt::Fatal(HubError::agent(
                Self::NAME,
                format!("request to {} returned {}", self.endpoint, status),
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Attempt::Retryable(HubError::HttpError(e)))?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| Attempt::Fatal(HubError::JsonError(e)))
    }

    fn merge_response(&self, mut payload: Payload, response: Value) -> Payload {
        match (&self.response_field, response) {
            (Some(field), response) => {
                payload.insert(field.clone(), response);
            }
            (None, Value::Object(map)) => {
                for (key, value) in map {
                    payload.insert(key, value);
                }
            }
            (None, Value::Null) => {}
            (None, other) => {
                payload.insert("response".to_string(), other);
            }
        }
        payload
    }
}

enum Attempt {
    Retryable(HubError),
    Fatal(HubError),
}

#[async_trait]
impl Agent for HttpAgent {
    async fn process(&self, payload: Payload) -> Result<Payload> {
        let mut attempt = 0;

        loop {
            match self.send_once(&payload).await {
                Ok(response) => return Ok(self.merge_response(payload, response)),
                Err(Attempt::Retryable(e)) if attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "🔄 HttpAgent attempt {}/{} failed: {}",
                        attempt,
                        self.retry_attempts + 1,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(Attempt::Retryable(e)) | Err(Attempt::Fatal(e)) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
