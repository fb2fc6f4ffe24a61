use crate::approval::{calculate_emi, heuristic_scores, parse_amount};
use crate::config::Config;
use crate::errors::AppError;
use crate::history;
use crate::models::*;
use crate::profile::resolve_profile;
use crate::scorers::Scorers;
use crate::scoring;
use crate::store::ProfileStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Scorer clients, built once and reused for every request.
    pub scorers: Scorers,
}

impl AppState {
    fn store(&self) -> ProfileStore {
        ProfileStore::new(self.db.clone())
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "microloan-scoring-api",
            "version": "0.1.0"
        })),
    )
}

/// GET /loan/:loan_id
///
/// Returns the merged applicant profile, keyed by section name; absent
/// sections are `null`.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<String>,
) -> Result<Json<ApplicantProfile>, AppError> {
    tracing::info!("GET /loan/{}", loan_id);
    let profile = resolve_profile(&state.store(), &loan_id).await?;
    Ok(Json(profile))
}

/// GET /riskband/:loan_id
pub async fn get_risk_band(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("GET /riskband/{}", loan_id);
    let result = scoring::generate_risk_band(&state.store(), &state.scorers.risk, &loan_id).await?;

    Ok(Json(json!({
        "success": true,
        "risk_band": result.risk_band,
        "score": result.score,
        "model_input": result.model_input,
    })))
}

/// GET /needband/:loan_id
pub async fn get_need_band(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("GET /needband/{}", loan_id);
    let result = scoring::generate_need_band(&state.store(), &state.scorers.need, &loan_id).await?;

    Ok(Json(json!({
        "success": true,
        "need_band": result.need_band,
        "score": Value::Null,
        "model_input": result.model_input,
    })))
}

/// GET /fraudband/:loan_id
pub async fn get_fraud_score(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("GET /fraudband/{}", loan_id);
    let result =
        scoring::generate_fraud_score(&state.store(), &state.scorers.fraud, &loan_id).await?;

    Ok(Json(json!({
        "success": true,
        "fraud_label": result.fraud_label,
        "fraud_score": result.fraud_score,
        "fraud_class": Value::Null,
        "model_input": result.model_input,
    })))
}

// ---- Admin review lists ----

fn masked_beneficiary(aadhar: &str) -> String {
    let suffix_start = aadhar.len().saturating_sub(4);
    format!("Beneficiary ({})", &aadhar[suffix_start..])
}

fn format_tracked_row(row: TrackedApplicationSummary, fallback_status: &str) -> ApplicationRow {
    let amount = parse_amount(row.loan_amount_applied.as_deref());
    let tenure = row.tenure_applied.unwrap_or(0);
    let scores = heuristic_scores(amount, tenure);

    ApplicationRow {
        id: row.loan_application_id,
        scheme: row.scheme.unwrap_or_else(|| "Not Provided".to_string()),
        beneficiary: masked_beneficiary(&row.aadhar_no),
        amount,
        tenure,
        status: row.status.unwrap_or_else(|| fallback_status.to_string()),
        application_date: row.applied_on,
        aadhar_no: row.aadhar_no,
        interest_rate: row.interest_rate,
        emi_amount: row.emi_amount,
        scores,
    }
}

async fn list_tracked_applications(
    state: &AppState,
    status: &str,
) -> Result<Json<Value>, AppError> {
    let rows = state.store().applications_by_status(status).await?;
    let applications: Vec<ApplicationRow> = rows
        .into_iter()
        .map(|row| format_tracked_row(row, status))
        .collect();

    Ok(Json(json!({
        "success": true,
        "applications": applications,
    })))
}

/// GET /api/loan-approval/pending
pub async fn pending_applications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("GET /api/loan-approval/pending");
    list_tracked_applications(&state, "PENDING").await
}

/// GET /api/loan-approval/rejected
pub async fn rejected_applications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("GET /api/loan-approval/rejected");
    list_tracked_applications(&state, "REJECTED").await
}

/// GET /api/loan-approval/approved
///
/// Approved loans come from the append-only `loan_history` table (one
/// row per loan, latest payment), with the scheme joined back in from
/// the tracking table.
pub async fn approved_applications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("GET /api/loan-approval/approved");
    let store = state.store();

    let rows = store.latest_loan_history().await?;
    let loan_ids: Vec<String> = rows.iter().map(|r| r.loan_id.clone()).collect();
    let scheme_map: std::collections::HashMap<String, String> = store
        .schemes_for_loans(&loan_ids)
        .await?
        .into_iter()
        .map(|(id, scheme)| (id, scheme.unwrap_or_else(|| "Not Provided".to_string())))
        .collect();

    let applications: Vec<ApplicationRow> = rows
        .into_iter()
        .map(|row| {
            let amount = row.loan_amount_sanctioned.unwrap_or(0.0);
            let tenure = row.loan_tenure_months.unwrap_or(0);
            let scores = heuristic_scores(amount, tenure);
            let scheme = scheme_map
                .get(&row.loan_id)
                .cloned()
                .unwrap_or_else(|| "Not Provided".to_string());

            ApplicationRow {
                id: row.loan_id,
                scheme,
                beneficiary: masked_beneficiary(&row.aadhar_no),
                amount,
                tenure,
                status: "APPROVED".to_string(),
                application_date: row.payment_timestamp,
                aadhar_no: row.aadhar_no,
                interest_rate: row.interest_rate,
                emi_amount: row.emi_amount,
                scores,
            }
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "applications": applications,
    })))
}

// ---- Status transitions ----

/// POST /api/loan-approval/approve
pub async fn approve_application(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ApproveRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(loan_id), Some(aadhar), Some(sanctioned), Some(tenure), Some(rate)) = (
        body.loan_application_id,
        body.aadhar_no,
        body.sanctioned_amount,
        body.tenure_approved,
        body.interest_rate,
    ) else {
        return Err(AppError::BadRequest(
            "loan_application_id, aadhar_no, sanctionedAmount, tenureApproved and interestRate are required"
                .to_string(),
        ));
    };

    tracing::info!("Approving application {} ({})", loan_id, masked_beneficiary(&aadhar));

    let emi = calculate_emi(sanctioned, rate, tenure);
    let updated = state
        .store()
        .approve_application(&loan_id, &aadhar, sanctioned, tenure, rate, emi)
        .await?;

    if updated == 0 {
        return Err(AppError::ApplicationNotFound(format!(
            "No application matching {} for that Aadhaar",
            loan_id
        )));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Application approved successfully",
        "emi": emi,
    })))
}

/// POST /api/loan-approval/reject
pub async fn reject_application(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(loan_id), Some(aadhar)) = (body.loan_application_id, body.aadhar_no) else {
        return Err(AppError::BadRequest(
            "loan_application_id and aadhar_no are required".to_string(),
        ));
    };

    tracing::info!("Rejecting application {}", loan_id);

    let updated = state
        .store()
        .update_application_status(&loan_id, &aadhar, "REJECTED")
        .await?;

    if updated == 0 {
        return Err(AppError::ApplicationNotFound(format!(
            "No application matching {} for that Aadhaar",
            loan_id
        )));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Application rejected successfully",
    })))
}

/// POST /api/loan-approval/manual-review
pub async fn manual_review(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ManualReviewRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(loan_id), Some(aadhar)) = (body.loan_application_id, body.aadhar_no) else {
        return Err(AppError::BadRequest(
            "loan_application_id and aadhar_no are required".to_string(),
        ));
    };

    tracing::info!("Sending application {} to manual review", loan_id);

    let updated = state
        .store()
        .update_application_status(&loan_id, &aadhar, "MANUAL_REVIEW")
        .await?;

    if updated == 0 {
        return Err(AppError::ApplicationNotFound(format!(
            "No application matching {} for that Aadhaar",
            loan_id
        )));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Application sent for manual review",
    })))
}

// ---- Loan history ingestion ----

/// Body of POST /api/loan-history/manual.
#[derive(Debug, Deserialize)]
pub struct ManualHistoryBody {
    pub rows: Option<Vec<Value>>,
}

/// POST /api/loan-history/manual
pub async fn insert_loan_history(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ManualHistoryBody>,
) -> Result<Json<Value>, AppError> {
    let rows = body.rows.unwrap_or_default();
    if rows.is_empty() {
        return Err(AppError::BadRequest("No rows provided".to_string()));
    }

    let non_empty: Vec<&Value> = rows.iter().filter(|r| !history::is_row_empty(r)).collect();
    if non_empty.is_empty() {
        return Err(AppError::BadRequest(
            "All rows are empty. Please fill at least one row.".to_string(),
        ));
    }

    let mapped = non_empty
        .iter()
        .map(|raw| history::map_row(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let inserted = state.store().insert_loan_history(&mapped).await?;
    tracing::info!("Inserted {} loan history row(s)", inserted);

    Ok(Json(json!({
        "success": true,
        "message": "Loan history records added successfully.",
        "insertedCount": inserted,
    })))
}
