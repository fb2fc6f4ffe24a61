//! Applicant profile resolution.
//!
//! Resolves an application id to its identity key, then fans out the
//! eleven section lookups concurrently and joins them into one merged
//! `ApplicantProfile`. Only the identity lookup and the primary loan
//! application are load-bearing: a failed lookup of any other section
//! degrades to a `null` section rather than failing the request.

use crate::errors::AppError;
use crate::models::ApplicantProfile;
use crate::store::ProfileStore;

/// Swallow an optional-section failure into `None`, keeping the
/// profile usable.
fn optional<T>(section: &'static str, result: Result<Option<T>, AppError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Section '{}' lookup failed, defaulting to null: {}", section, e);
            None
        }
    }
}

/// Resolve the merged applicant profile for an application id.
///
/// Fails with `IdentityNotFound` when no tracking record maps the id to
/// an identity key, and with `ApplicationNotFound` when the primary
/// loan application record is missing. All other sections are optional.
pub async fn resolve_profile(
    store: &ProfileStore,
    loan_id: &str,
) -> Result<ApplicantProfile, AppError> {
    let aadhar = store
        .identity_for_application(loan_id)
        .await?
        .ok_or_else(|| {
            AppError::IdentityNotFound(format!("Aadhaar not found for loan {}", loan_id))
        })?;

    // Independent lookups, joined before mapping proceeds
    let (
        loan_application,
        beneficiary,
        apply_for_loan,
        track_application,
        bank_details,
        expenses_and_commodities,
        income_asset,
        beneficiary_status,
        electricity_bill,
        water_bill,
        ration_card,
    ) = tokio::join!(
        store.loan_application(loan_id, &aadhar),
        store.beneficiary(&aadhar),
        store.apply_for_loan(loan_id, &aadhar),
        store.track_application(loan_id, &aadhar),
        store.bank_details(loan_id, &aadhar),
        store.expenses_and_commodities(loan_id, &aadhar),
        store.income_asset(loan_id, &aadhar),
        store.beneficiary_status(loan_id, &aadhar),
        store.electricity_bill(&aadhar),
        store.water_bill(&aadhar),
        store.ration_card(&aadhar),
    );

    let loan_application = loan_application?.ok_or_else(|| {
        AppError::ApplicationNotFound(format!("Loan application not found for {}", loan_id))
    })?;

    Ok(ApplicantProfile {
        loan_application: Some(loan_application),
        beneficiary: optional("beneficiary", beneficiary),
        apply_for_loan: optional("apply_for_loan", apply_for_loan),
        track_application: optional("track_application", track_application),
        bank_details: optional("bank_details", bank_details),
        expenses_and_commodities: optional(
            "expenses_and_commodities",
            expenses_and_commodities,
        ),
        income_asset: optional("income_asset", income_asset),
        beneficiary_status: optional("beneficiary_status", beneficiary_status),
        electricity_bill: optional("electricity_bill", electricity_bill),
        water_bill: optional("water_bill", water_bill),
        ration_card: optional("ration_card", ration_card),
    })
}
