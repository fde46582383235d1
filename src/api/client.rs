use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{ScenarioRequest, ScenarioResult, ValidationError};

pub const RUN_SIMULATION_PATH: &str = "/run_simulation";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong, please try again.";

/// Everything that can stop a submission from producing a result.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("simulation service unavailable: {0}")]
    Transport(String),
    #[error("malformed simulation response: {0}")]
    MalformedResponse(String),
}

impl SubmitError {
    /// The only text a user ever sees for a failed submission.
    pub fn user_message(&self) -> &'static str {
        GENERIC_ERROR_MESSAGE
    }
}

/// Something that can run a scenario projection.
#[async_trait]
pub trait SimulationService: Send + Sync {
    async fn run_simulation(&self, request: &ScenarioRequest)
    -> Result<ScenarioResult, SubmitError>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` leaves the call to the transport's own behavior.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

/// HTTP client for the `/run_simulation` endpoint.
pub struct SimulationClient {
    client: reqwest::Client,
    url: String,
}

impl SimulationClient {
    pub fn new(config: &ClientConfig) -> Result<Self, SubmitError> {
        let client = config
            .http_client()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: config.endpoint(RUN_SIMULATION_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SimulationService for SimulationClient {
    async fn run_simulation(
        &self,
        request: &ScenarioRequest,
    ) -> Result<ScenarioResult, SubmitError> {
        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SubmitError::Transport(format!(
                "response not ok (status {status})"
            )));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        let result: ScenarioResult = serde_json::from_slice(&body)
            .map_err(|e| SubmitError::MalformedResponse(e.to_string()))?;
        result
            .check_ordering()
            .map_err(SubmitError::MalformedResponse)?;

        tracing::debug!(
            points = result.point_count(),
            "simulation response received"
        );
        Ok(result)
    }
}
