//! Clients for the three externally hosted ML scoring services.
//!
//! Each scorer exposes a single `/predict` endpoint that takes the
//! fixed-schema feature vector as its JSON body. One blocking round
//! trip per request; no retries or backoff, a failed call surfaces
//! immediately as `ScorerUnavailable`.

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{
    FraudFeatureVector, FraudScorerResponse, NeedFeatureVector, NeedScorerResponse,
    RiskFeatureVector, RiskScorerResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

async fn post_predict<I, O>(client: &Client, base_url: &str, input: &I) -> Result<O, AppError>
where
    I: Serialize + ?Sized,
    O: DeserializeOwned,
{
    let url = format!("{}/predict", base_url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .json(input)
        .send()
        .await
        .map_err(|e| AppError::ScorerUnavailable(format!("Scorer request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::error!("Scorer returned error {}: {}", status, error_text);
        return Err(AppError::ScorerUnavailable(format!(
            "Scorer returned status {}: {}",
            status, error_text
        )));
    }

    response.json().await.map_err(|e| {
        AppError::ScorerUnavailable(format!("Failed to parse scorer response: {}", e))
    })
}

/// The three scorer clients, constructed once at startup and shared
/// across requests through the application state. All three reuse one
/// connection pool.
pub struct Scorers {
    pub risk: RiskScorer,
    pub need: NeedScorer,
    pub fraud: FraudScorer,
}

impl Scorers {
    pub fn new(config: &Config) -> Self {
        let client = Client::new();
        Self {
            risk: RiskScorer {
                client: client.clone(),
                base_url: config.risk_scorer_url.clone(),
            },
            need: NeedScorer {
                client: client.clone(),
                base_url: config.need_scorer_url.clone(),
            },
            fraud: FraudScorer {
                client,
                base_url: config.fraud_scorer_url.clone(),
            },
        }
    }
}

/// Client for the credit-risk scorer.
pub struct RiskScorer {
    client: Client,
    base_url: String,
}

impl RiskScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.risk_scorer_url.clone(),
        }
    }

    pub async fn predict(
        &self,
        input: &RiskFeatureVector,
    ) -> Result<RiskScorerResponse, AppError> {
        tracing::debug!("POST {}/predict (risk vector)", self.base_url);
        post_predict(&self.client, &self.base_url, input).await
    }
}

/// Client for the socio-economic need scorer.
pub struct NeedScorer {
    client: Client,
    base_url: String,
}

impl NeedScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.need_scorer_url.clone(),
        }
    }

    pub async fn predict(
        &self,
        input: &NeedFeatureVector,
    ) -> Result<NeedScorerResponse, AppError> {
        tracing::debug!("POST {}/predict (need vector)", self.base_url);
        post_predict(&self.client, &self.base_url, input).await
    }
}

/// Client for the fraud scorer.
pub struct FraudScorer {
    client: Client,
    base_url: String,
}

impl FraudScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.fraud_scorer_url.clone(),
        }
    }

    pub async fn predict(
        &self,
        input: &FraudFeatureVector,
    ) -> Result<FraudScorerResponse, AppError> {
        tracing::debug!("POST {}/predict (fraud vector)", self.base_url);
        post_predict(&self.client, &self.base_url, input).await
    }
}
