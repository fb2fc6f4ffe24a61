//! Scoring orchestrators: one per external scorer.
//!
//! Each workflow is the same thin pipeline: resolve the identity key,
//! run the scorer-specific auxiliary lookups, resolve the merged
//! profile, map it to the feature vector, POST to the scorer, and
//! normalize the response. Nothing is cached; every request re-resolves
//! and re-derives from scratch.

use crate::errors::AppError;
use crate::fraud::map_fraud;
use crate::models::{FraudFeatureVector, NeedFeatureVector, RiskFeatureVector};
use crate::need::map_need;
use crate::profile::resolve_profile;
use crate::risk::map_risk;
use crate::scorers::{FraudScorer, NeedScorer, RiskScorer};
use crate::store::ProfileStore;
use chrono::Utc;

/// Normalized result of a risk-band request.
#[derive(Debug, Clone)]
pub struct RiskBandResult {
    pub risk_band: String,
    pub score: Option<f64>,
    pub class_index: Option<i32>,
    pub model_input: RiskFeatureVector,
}

/// Normalized result of a need-band request.
#[derive(Debug, Clone)]
pub struct NeedBandResult {
    pub need_band: String,
    pub model_input: NeedFeatureVector,
}

/// Normalized result of a fraud-score request.
#[derive(Debug, Clone)]
pub struct FraudScoreResult {
    pub fraud_label: String,
    pub fraud_score: Option<f64>,
    pub model_input: FraudFeatureVector,
}

pub async fn generate_risk_band(
    store: &ProfileStore,
    scorer: &RiskScorer,
    loan_id: &str,
) -> Result<RiskBandResult, AppError> {
    let aadhar = store
        .identity_for_application(loan_id)
        .await?
        .ok_or_else(|| {
            AppError::IdentityNotFound(format!("Aadhaar not found for loan {}", loan_id))
        })?;

    let previous_loans = store.prior_application_count(&aadhar).await?;
    let profile = resolve_profile(store, loan_id).await?;

    let model_input = map_risk(&profile, previous_loans as usize, Utc::now());
    tracing::info!(
        "Risk vector for loan {}: {} previous loan(s), {} repayment(s) made",
        loan_id,
        previous_loans,
        model_input.repayments_made
    );

    let response = scorer.predict(&model_input).await?;

    Ok(RiskBandResult {
        risk_band: response
            .risk_label
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        score: response.probability,
        class_index: response.class_index,
        model_input,
    })
}

pub async fn generate_need_band(
    store: &ProfileStore,
    scorer: &NeedScorer,
    loan_id: &str,
) -> Result<NeedBandResult, AppError> {
    let profile = resolve_profile(store, loan_id).await?;

    let model_input = map_need(&profile);
    tracing::info!(
        "Need vector for loan {}: category {}, dependency ratio {}",
        loan_id,
        model_input.ration_card_category,
        model_input.dependency_ratio
    );

    let response = scorer.predict(&model_input).await?;

    Ok(NeedBandResult {
        need_band: response
            .prediction
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        model_input,
    })
}

pub async fn generate_fraud_score(
    store: &ProfileStore,
    scorer: &FraudScorer,
    loan_id: &str,
) -> Result<FraudScoreResult, AppError> {
    let aadhar = store
        .identity_for_application(loan_id)
        .await?
        .ok_or_else(|| {
            AppError::IdentityNotFound(format!("Aadhaar not found for loan {}", loan_id))
        })?;

    let linked = store.linked_account_counts(&aadhar).await?;
    let profile = resolve_profile(store, loan_id).await?;

    let model_input = map_fraud(&profile, linked, Utc::now());
    tracing::info!(
        "Fraud vector for loan {}: {} mobile-linked, {} aadhaar-linked account(s)",
        loan_id,
        linked.mobile,
        linked.aadhaar
    );

    let response = scorer.predict(&model_input).await?;

    Ok(FraudScoreResult {
        fraud_label: response
            .risk_level
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        fraud_score: response.fraud_probability,
        model_input,
    })
}
