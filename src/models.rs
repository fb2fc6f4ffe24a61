use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============ Profile Sections ============
//
// One struct per applicant-data section. Identifier and audit columns
// (aadhar_no / aadhaar_no, loan_application_id, created_at, updated_at)
// are deliberately absent from these structs: the store layer never
// selects them, so they cannot leak into the merged profile or the
// ML feature space.

/// Primary loan application record.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct LoanApplication {
    pub applicant_name: Option<String>,
    pub phone_no: Option<String>,
    pub scheme: Option<String>,
    pub loan_amount: Option<f64>,
    pub status: Option<String>,
}

/// Beneficiary identity and address details.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct Beneficiary {
    pub full_name: Option<String>,
    pub phone_no: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub pincode: Option<String>,
}

/// Loan request details captured at application time.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct ApplyForLoan {
    pub purpose_of_loan: Option<String>,
    pub interest_rate: Option<f64>,
    pub emi_amount: Option<f64>,
}

/// Application tracking record; carries the workflow status and the
/// sanctioned terms once approved.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct TrackApplication {
    pub applied_on: Option<DateTime<Utc>>,
    /// Legacy text column; parse with `approval::parse_amount`.
    pub loan_amount_applied: Option<String>,
    /// Legacy text column; parse with `approval::parse_amount`.
    pub loan_amount_approved: Option<String>,
    pub tenure_applied: Option<i32>,
    pub tenure_approved: Option<i32>,
    pub interest_rate: Option<f64>,
    pub emi_amount: Option<f64>,
    pub scheme: Option<String>,
    pub status: Option<String>,
}

/// Bank account details for disbursement.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_name: Option<String>,
    pub account_no: Option<String>,
    pub ifsc_code: Option<String>,
    pub branch: Option<String>,
}

/// Self-declared and provider-observed expense data (mobile recharge,
/// LPG refills, electricity account).
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct ExpensesAndCommodities {
    pub elec_account_no: Option<String>,
    pub user_provider_avg_recharge_amount: Option<f64>,
    pub api_provider_avg_recharge_amount: Option<f64>,
    pub user_refills_in_last_3m: Option<i32>,
    pub provider_refills_in_last_3m: Option<i32>,
    pub user_average_refill_cost: Option<f64>,
    pub provider_average_refill_cost: Option<f64>,
    pub user_average_refill_interval_days: Option<f64>,
    pub provider_average_refill_interval_days: Option<f64>,
}

/// Declared income and asset position.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct IncomeAsset {
    pub monthly_income: Option<f64>,
    pub annual_income: Option<f64>,
    pub asset_count: Option<i32>,
    pub estimated_asset_value: Option<f64>,
}

/// Welfare-scheme enrollment flags.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct BeneficiaryStatus {
    pub mgnrega: Option<bool>,
    pub pm_ujjwala_yojana: Option<bool>,
    pub pm_jay: Option<bool>,
    pub enrolled_in_pension_scheme: Option<bool>,
}

/// Electricity bill aggregates over the trailing three months.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct ElectricityBill {
    pub elec_account_no: Option<String>,
    pub elec_total_bills: Option<i32>,
    pub elec_on_time_bills_3m: Option<i32>,
    pub elec_total_delay_days_3m: Option<i32>,
    pub elec_max_delay_days_3m: Option<i32>,
    pub elec_outstanding_amount_current: Option<f64>,
    pub elec_avg_bill_amt_3m: Option<f64>,
    /// Consumption-drop flag supplied by the utility feed.
    pub flag: Option<i32>,
}

/// Water bill aggregates over the trailing three months.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct WaterBill {
    pub water_total_bills_3m: Option<i32>,
    pub water_on_time_bills_3m: Option<i32>,
    pub water_total_delay_days_3m: Option<i32>,
    pub water_max_delay_days_3m: Option<i32>,
    pub water_outstanding_amt_current: Option<f64>,
}

/// Ration card / SECC household data, joined on a masked identifier.
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct RationCard {
    pub ration_card_no: Option<String>,
    pub ration_card_category: Option<String>,
    pub household_size: Option<i32>,
    pub earners_cnt: Option<i32>,
    pub dependents_cnt: Option<i32>,
}

/// Merged applicant profile, assembled fresh for each request.
///
/// Absent sections serialize as `null`. The profile is read-only
/// combined data: there is no update path and no caching across
/// requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub loan_application: Option<LoanApplication>,
    pub beneficiary: Option<Beneficiary>,
    pub apply_for_loan: Option<ApplyForLoan>,
    pub track_application: Option<TrackApplication>,
    pub bank_details: Option<BankDetails>,
    pub expenses_and_commodities: Option<ExpensesAndCommodities>,
    pub income_asset: Option<IncomeAsset>,
    pub beneficiary_status: Option<BeneficiaryStatus>,
    pub electricity_bill: Option<ElectricityBill>,
    pub water_bill: Option<WaterBill>,
    pub ration_card: Option<RationCard>,
}

/// Count of beneficiary records sharing the applicant's phone number
/// and identity key. Computed by the store, consumed by the fraud
/// mapper as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedAccountCounts {
    pub mobile: i32,
    pub aadhaar: i32,
}

// ============ Feature Vectors ============
//
// Each vector is a fixed-schema payload for one external scorer.
// Field declaration order matches the order the scorer expects;
// serde serializes fields in declaration order, so these structs are
// the schema contract. Every field is always present.

/// Credit-risk model input (23 fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFeatureVector {
    pub loan_amount_sanctioned: f64,
    pub loan_amount_disbursed: f64,
    pub loan_tenure_months: i32,
    pub interest_rate: f64,
    pub emi_amount: f64,
    pub repayments_made: i32,
    pub total_amount_repaid: f64,
    pub dpd_days: i32,
    pub default_flag: i32,
    pub npa_status: i32,
    pub repeat_borrower_flag: i32,
    pub previous_loans_count: i32,
    pub previous_defaults_count: i32,
    pub loan_utilization_match_flag: i32,
    pub cashflow_seasonality_score: i32,
    pub inventory_purchase_ratio: f64,
    pub business_monthly_revenue: f64,
    pub business_operational_years: i32,
    pub util_on_time_ratio: f64,
    pub util_avg_delay_days: f64,
    pub util_max_delay_days: f64,
    pub util_total_outstanding_12m: f64,
    pub util_any_outstanding_flag: i32,
}

/// Socio-economic need model input (26 fields), including the
/// one-hot SECC deprivation indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedFeatureVector {
    pub household_size: i32,
    pub household_dependents_count: i32,
    pub earners_cnt: i32,
    pub dependency_ratio: f64,
    pub ration_card_category: String,
    pub govt_scheme_eligibility_flag: String,
    pub enrolled_mgnrega_flag: String,
    pub enrolled_ujjwala_flag: String,
    pub enrolled_pmjay_flag: String,
    pub enrolled_pension_flag: String,
    pub asset_count: i32,
    pub asset_value_estimate: f64,
    pub household_income_self_declared: f64,
    pub avg_monthly_electricity_units: i32,
    pub avg_mobile_recharge_amount: f64,
    pub avg_monthly_water_bill: f64,
    pub avg_monthly_gas_refill_cost: f64,
    pub lpg_refills_3month: i32,
    pub lpg_avg_refill_interval_days: f64,
    #[serde(rename = "secc_D1")]
    pub secc_d1: i32,
    #[serde(rename = "secc_D2")]
    pub secc_d2: i32,
    #[serde(rename = "secc_D3")]
    pub secc_d3: i32,
    #[serde(rename = "secc_D4")]
    pub secc_d4: i32,
    #[serde(rename = "secc_D5")]
    pub secc_d5: i32,
    #[serde(rename = "secc_D6")]
    pub secc_d6: i32,
    #[serde(rename = "secc_D7")]
    pub secc_d7: i32,
}

/// Fraud-signal model input (20 fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudFeatureVector {
    pub geo_location_mismatch_flag: i32,
    pub sudden_consumption_drop_flag: i32,
    pub electricity_mismatch_flag: i32,
    pub recharge_mismatch_flag: i32,
    pub household_data_mismatch_flag: i32,
    pub ration_category_mismatch: i32,
    pub bill_manipulation_flag: i32,
    pub unusual_submission_time_flag: i32,
    pub field_edits: i32,
    pub form_completion_time: i32,
    pub mobile_number_linked_accounts: i32,
    pub aadhaar_linked_accounts: i32,
    pub elec_any_disconnection_flag: i32,
    pub elec_outstanding_amount_current: f64,
    pub elec_total_delay_days_12m: i32,
    pub elec_on_time_bills_12m: i32,
    pub util_any_outstanding_flag: i32,
    pub util_total_outstanding_12m: f64,
    pub util_on_time_ratio: f64,
    pub data_completeness_score: f64,
}

// ============ Scorer Responses ============

/// Response from the external risk scorer.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskScorerResponse {
    pub risk_label: Option<String>,
    pub probability: Option<f64>,
    pub class_index: Option<i32>,
}

/// Response from the external need scorer.
#[derive(Debug, Clone, Deserialize)]
pub struct NeedScorerResponse {
    pub prediction: Option<String>,
}

/// Response from the external fraud scorer.
#[derive(Debug, Clone, Deserialize)]
pub struct FraudScorerResponse {
    pub risk_level: Option<String>,
    pub fraud_probability: Option<f64>,
}

// ============ Admin Panel Models ============

/// Deterministic heuristic scoring attached to admin list rows.
/// Serialized in camelCase for the admin console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicScores {
    pub credit_score: i32,
    pub risk_score: f64,
    pub fraud_probability: f64,
    pub need_score: f64,
    pub estimated_income: f64,
    pub estimated_safe_loan: f64,
    pub band_classification: String,
    pub final_eligibility_score: f64,
}

/// Formatted application row for the admin review lists.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationRow {
    pub id: String,
    pub scheme: String,
    pub beneficiary: String,
    pub amount: f64,
    pub tenure: i32,
    pub status: String,
    #[serde(rename = "applicationDate")]
    pub application_date: Option<DateTime<Utc>>,
    pub aadhar_no: String,
    pub interest_rate: Option<f64>,
    pub emi_amount: Option<f64>,
    #[serde(flatten)]
    pub scores: HeuristicScores,
}

/// Tracking-table row backing the pending/rejected admin lists.
#[derive(Debug, Clone, FromRow)]
pub struct TrackedApplicationSummary {
    pub loan_application_id: String,
    pub applied_on: Option<DateTime<Utc>>,
    pub loan_amount_applied: Option<String>,
    pub scheme: Option<String>,
    pub tenure_applied: Option<i32>,
    pub status: Option<String>,
    pub aadhar_no: String,
    pub interest_rate: Option<f64>,
    pub emi_amount: Option<f64>,
}

/// Latest loan-history row per loan, backing the approved admin list.
#[derive(Debug, Clone, FromRow)]
pub struct LoanHistorySummary {
    pub loan_id: String,
    pub payment_timestamp: Option<DateTime<Utc>>,
    pub loan_amount_sanctioned: Option<f64>,
    pub loan_amount_disbursed: Option<f64>,
    pub loan_tenure_months: Option<i32>,
    pub interest_rate: Option<f64>,
    pub emi_amount: Option<f64>,
    pub aadhar_no: String,
}

/// Body of POST /api/loan-approval/approve.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveRequest {
    pub loan_application_id: Option<String>,
    pub aadhar_no: Option<String>,
    #[serde(rename = "sanctionedAmount")]
    pub sanctioned_amount: Option<f64>,
    #[serde(rename = "tenureApproved")]
    pub tenure_approved: Option<i32>,
    #[serde(rename = "interestRate")]
    pub interest_rate: Option<f64>,
}

/// Body of POST /api/loan-approval/reject.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectRequest {
    pub loan_application_id: Option<String>,
    pub aadhar_no: Option<String>,
    pub reason: Option<String>,
}

/// Body of POST /api/loan-approval/manual-review.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualReviewRequest {
    pub loan_application_id: Option<String>,
    pub aadhar_no: Option<String>,
    pub note: Option<String>,
}
