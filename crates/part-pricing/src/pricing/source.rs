use super::domain::RawAttributes;
use crate::config::SourceConfig;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Where part records come from. `Ok(None)` means the part is unknown.
#[async_trait]
pub trait PartSource: Send + Sync {
    async fn fetch(&self, parte: &str) -> Result<Option<RawAttributes>, ExternalCallError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExternalCallError {
    #[error("part API URL is not configured (set PART_API_URL)")]
    NotConfigured,
    #[error("part API request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("part API answered with status {0}")]
    Status(u16),
    #[error("part API returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("part API returned an unexpected payload: {0}")]
    UnexpectedPayload(&'static str),
}

/// HTTP client for the engineering-data query that returns one part per `Parte` code.
#[derive(Debug, Clone)]
pub struct ErpPartClient {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl ErpPartClient {
    pub fn new(config: &SourceConfig) -> Result<Self, ExternalCallError> {
        let base_url = config
            .base_url
            .clone()
            .ok_or(ExternalCallError::NotConfigured)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ExternalCallError::Transport)?;

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl PartSource for ErpPartClient {
    async fn fetch(&self, parte: &str) -> Result<Option<RawAttributes>, ExternalCallError> {
        let mut request = self.client.get(&self.base_url).query(&[("Parte", parte)]);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await.map_err(ExternalCallError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExternalCallError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(ExternalCallError::Decode)?;
        debug!(parte, "part API responded");
        first_record(body)
    }
}

/// Extracts the first entry of the `value` array of a query response.
pub fn first_record(body: Value) -> Result<Option<RawAttributes>, ExternalCallError> {
    let Value::Object(mut envelope) = body else {
        return Err(ExternalCallError::UnexpectedPayload("response is not an object"));
    };

    match envelope.remove("value") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(records)) => match records.into_iter().next() {
            None => Ok(None),
            Some(Value::Object(record)) => Ok(Some(record)),
            Some(_) => Err(ExternalCallError::UnexpectedPayload(
                "record is not an object",
            )),
        },
        Some(_) => Err(ExternalCallError::UnexpectedPayload(
            "'value' is not an array",
        )),
    }
}
