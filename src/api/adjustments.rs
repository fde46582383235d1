use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::client::ClientConfig;

pub const ADJUSTMENTS_PATH: &str = "/ai_generated_adjustments";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub investments: f64,
    pub debt: f64,
    pub risk_tolerance: String,
}

/// The service sends a sentence, but its fallback value is a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavingsPlan {
    Text(String),
    Amount(f64),
}

impl fmt::Display for SavingsPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SavingsPlan::Text(text) => f.write_str(text),
            SavingsPlan::Amount(amount) => write!(f, "{amount}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub investment_strategy: String,
    pub savings_plan: SavingsPlan,
    pub debt_strategy: String,
    /// Percentage, as sent by the service.
    pub projected_growth: f64,
}

impl Recommendation {
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Investment Strategy: {}", self.investment_strategy),
            format!("Optimal Savings Plan: {}", self.savings_plan),
            format!("Debt Repayment Strategy: {}", self.debt_strategy),
            format!("Projected Growth: {}%", self.projected_growth),
        ]
    }
}

#[derive(Debug, Error)]
pub enum AdjustmentError {
    #[error("adjustment service unavailable: {0}")]
    Transport(String),
    #[error("adjustment service reported: {0}")]
    Service(String),
    #[error("malformed adjustment response: {0}")]
    MalformedResponse(String),
}

/// Wire shape: either the four recommendation fields or `{error}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AdjustmentReply {
    error: Option<String>,
    investment_strategy: Option<String>,
    savings_plan: Option<SavingsPlan>,
    debt_strategy: Option<String>,
    projected_growth: Option<f64>,
}

impl AdjustmentReply {
    fn into_recommendation(self) -> Result<Recommendation, AdjustmentError> {
        if let Some(error) = self.error {
            return Err(AdjustmentError::Service(error));
        }
        let missing = |field: &str| AdjustmentError::MalformedResponse(format!("missing {field}"));
        Ok(Recommendation {
            investment_strategy: self
                .investment_strategy
                .ok_or_else(|| missing("investment_strategy"))?,
            savings_plan: self.savings_plan.ok_or_else(|| missing("savings_plan"))?,
            debt_strategy: self.debt_strategy.ok_or_else(|| missing("debt_strategy"))?,
            projected_growth: self
                .projected_growth
                .ok_or_else(|| missing("projected_growth"))?,
        })
    }
}

/// HTTP client for the recommendation endpoint.
pub struct AdjustmentsClient {
    client: reqwest::Client,
    url: String,
}

impl AdjustmentsClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AdjustmentError> {
        let client = config
            .http_client()
            .map_err(|e| AdjustmentError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: config.endpoint(ADJUSTMENTS_PATH),
        })
    }

    pub async fn request(
        &self,
        request: &AdjustmentRequest,
    ) -> Result<Recommendation, AdjustmentError> {
        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| AdjustmentError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| AdjustmentError::Transport(e.to_string()))?;
        let reply = serde_json::from_slice::<AdjustmentReply>(&body);

        if !status.is_success() {
            // Error statuses usually carry `{error}`; anything else is opaque.
            return match reply {
                Ok(AdjustmentReply {
                    error: Some(error), ..
                }) => Err(AdjustmentError::Service(error)),
                _ => Err(AdjustmentError::Transport(format!(
                    "response not ok (status {status})"
                ))),
            };
        }

        reply
            .map_err(|e| AdjustmentError::MalformedResponse(e.to_string()))?
            .into_recommendation()
    }
}
