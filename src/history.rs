//! Manual ingestion of historical loan records.
//!
//! The admin console posts rows as loose JSON (values arrive as strings
//! or numbers depending on how the form was filled), so coercion is
//! lenient: currency formatting is stripped, blanks become NULL, and a
//! few counters default to 0. Rows land in the append-only
//! `loan_history` table and never feed the feature pipeline.

use crate::errors::AppError;
use serde_json::Value;

/// Columns of the `loan_history` table, used for empty-row detection.
const LOAN_HISTORY_COLUMNS: [&str; 17] = [
    "loan_id",
    "payment_timestamp",
    "loan_amount_sanctioned",
    "loan_amount_disbursed",
    "loan_tenure_months",
    "interest_rate",
    "emi_amount",
    "repayments_made",
    "total_amount_repaid",
    "last_payment_date",
    "dpd_days",
    "default_flag",
    "npa_status",
    "repeat_borrower_flag",
    "previous_loans_count",
    "previous_defaults_count",
    "aadhar_no",
];

/// A validated loan-history row ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanHistoryRow {
    pub loan_id: String,
    pub payment_timestamp: String,
    pub aadhar_no: String,
    pub loan_amount_sanctioned: Option<f64>,
    pub loan_amount_disbursed: Option<f64>,
    pub loan_tenure_months: Option<i64>,
    pub interest_rate: Option<f64>,
    pub emi_amount: Option<f64>,
    pub repayments_made: Option<i64>,
    pub total_amount_repaid: Option<f64>,
    pub last_payment_date: Option<String>,
    pub dpd_days: i64,
    pub default_flag: Option<i64>,
    pub npa_status: Option<i64>,
    pub repeat_borrower_flag: Option<i64>,
    pub previous_loans_count: i64,
    pub previous_defaults_count: i64,
}

fn to_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}

fn to_integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_f64().map(|v| v.trunc() as i64),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '-')
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}

fn to_trimmed_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A raw row is empty when every known column is absent, null, or "".
pub fn is_row_empty(raw: &Value) -> bool {
    LOAN_HISTORY_COLUMNS.iter().all(|col| match raw.get(col) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    })
}

/// Coerce and validate one raw row. Fails with `BadRequest` when the
/// required identifiers are missing.
pub fn map_row(raw: &Value) -> Result<LoanHistoryRow, AppError> {
    let loan_id = to_trimmed_string(raw.get("loan_id"));
    let payment_timestamp = to_trimmed_string(raw.get("payment_timestamp"));
    let aadhar_no = to_trimmed_string(raw.get("aadhar_no"));

    let (Some(loan_id), Some(payment_timestamp), Some(aadhar_no)) =
        (loan_id, payment_timestamp, aadhar_no)
    else {
        return Err(AppError::BadRequest(
            "Each row must have loan_id, payment_timestamp, and aadhar_no.".to_string(),
        ));
    };

    Ok(LoanHistoryRow {
        loan_id,
        payment_timestamp,
        aadhar_no,
        loan_amount_sanctioned: to_number(raw.get("loan_amount_sanctioned")),
        loan_amount_disbursed: to_number(raw.get("loan_amount_disbursed")),
        loan_tenure_months: to_integer(raw.get("loan_tenure_months")),
        interest_rate: to_number(raw.get("interest_rate")),
        emi_amount: to_number(raw.get("emi_amount")),
        repayments_made: to_integer(raw.get("repayments_made")),
        total_amount_repaid: to_number(raw.get("total_amount_repaid")),
        last_payment_date: to_trimmed_string(raw.get("last_payment_date")),
        dpd_days: to_integer(raw.get("dpd_days")).unwrap_or(0),
        default_flag: to_integer(raw.get("default_flag")),
        npa_status: to_integer(raw.get("npa_status")),
        repeat_borrower_flag: to_integer(raw.get("repeat_borrower_flag")),
        previous_loans_count: to_integer(raw.get("previous_loans_count")).unwrap_or(0),
        previous_defaults_count: to_integer(raw.get("previous_defaults_count")).unwrap_or(0),
    })
}
