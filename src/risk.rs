//! Credit-risk feature derivation.
//!
//! Pure mapping from a merged applicant profile (plus the prior-loan
//! count) to the fixed 23-field risk vector. All defaults are
//! deterministic zeros; the clock is injected so repeated calls on the
//! same snapshot produce byte-identical vectors.

use crate::approval::parse_amount;
use crate::models::{ApplicantProfile, RiskFeatureVector};
use chrono::{DateTime, Datelike, Utc};

/// Whole calendar months elapsed between application and `now`,
/// floored at zero. Day-of-month is ignored on purpose: a repayment is
/// counted per started month.
fn months_elapsed(applied_on: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    let diff = (now.year() - applied_on.year()) * 12 + now.month() as i32
        - applied_on.month() as i32;
    diff.max(0)
}

/// Derive the risk feature vector.
///
/// `previous_loans_count` is the number of tracking records sharing the
/// applicant's identity key, resolved by the caller.
pub fn map_risk(
    profile: &ApplicantProfile,
    previous_loans_count: usize,
    now: DateTime<Utc>,
) -> RiskFeatureVector {
    let track = profile.track_application.as_ref();
    let apply = profile.apply_for_loan.as_ref();
    let elec = profile.electricity_bill.as_ref();
    let water = profile.water_bill.as_ref();

    let applied_on = track.and_then(|t| t.applied_on).unwrap_or(now);
    let repayments_made = months_elapsed(applied_on, now);

    let loan_amount_sanctioned =
        parse_amount(track.and_then(|t| t.loan_amount_applied.as_deref()));
    let loan_amount_disbursed =
        parse_amount(track.and_then(|t| t.loan_amount_approved.as_deref()));

    let loan_tenure_months = track
        .and_then(|t| t.tenure_approved.or(t.tenure_applied))
        .unwrap_or(0);

    let emi_amount = match apply.and_then(|a| a.emi_amount) {
        Some(emi) => emi,
        None if loan_tenure_months > 0 => {
            (loan_amount_disbursed / f64::from(loan_tenure_months)).floor()
        }
        None => 0.0,
    };

    let total_amount_repaid = emi_amount * f64::from(repayments_made);

    let previous_loans_count = previous_loans_count as i32;
    let repeat_borrower_flag = i32::from(previous_loans_count > 0);

    // Utility aggregates across both channels; absent bills contribute 0.
    let total_bills = elec.and_then(|e| e.elec_total_bills).unwrap_or(0)
        + water.and_then(|w| w.water_total_bills_3m).unwrap_or(0);
    let on_time_bills = elec.and_then(|e| e.elec_on_time_bills_3m).unwrap_or(0)
        + water.and_then(|w| w.water_on_time_bills_3m).unwrap_or(0);
    let util_on_time_ratio = if total_bills > 0 {
        f64::from(on_time_bills) / f64::from(total_bills)
    } else {
        0.0
    };

    let util_avg_delay_days = f64::from(
        elec.and_then(|e| e.elec_total_delay_days_3m).unwrap_or(0)
            + water.and_then(|w| w.water_total_delay_days_3m).unwrap_or(0),
    ) / 2.0;

    let util_max_delay_days = f64::from(
        elec.and_then(|e| e.elec_max_delay_days_3m)
            .unwrap_or(0)
            .max(water.and_then(|w| w.water_max_delay_days_3m).unwrap_or(0)),
    );

    let util_total_outstanding_12m = elec
        .and_then(|e| e.elec_outstanding_amount_current)
        .unwrap_or(0.0)
        + water
            .and_then(|w| w.water_outstanding_amt_current)
            .unwrap_or(0.0);

    let loan_utilization_match_flag = i32::from(
        apply
            .and_then(|a| a.purpose_of_loan.as_deref())
            .map(|p| !p.trim().is_empty())
            .unwrap_or(false),
    );

    RiskFeatureVector {
        loan_amount_sanctioned,
        loan_amount_disbursed,
        loan_tenure_months,
        interest_rate: apply.and_then(|a| a.interest_rate).unwrap_or(0.0),
        emi_amount,
        repayments_made,
        total_amount_repaid,
        // Delinquency history is not collected yet; held at deterministic
        // zero rather than fabricated.
        dpd_days: 0,
        default_flag: 0,
        npa_status: 0,
        repeat_borrower_flag,
        previous_loans_count,
        previous_defaults_count: 0,
        loan_utilization_match_flag,
        cashflow_seasonality_score: 0,
        inventory_purchase_ratio: 0.0,
        business_monthly_revenue: profile
            .income_asset
            .as_ref()
            .and_then(|i| i.monthly_income)
            .unwrap_or(0.0),
        business_operational_years: 0,
        util_on_time_ratio,
        util_avg_delay_days,
        util_max_delay_days,
        util_total_outstanding_12m,
        util_any_outstanding_flag: i32::from(util_total_outstanding_12m > 0.0),
    }
}
