//! Fraud-signal feature derivation.
//!
//! Pure mapping from the merged profile (plus externally-computed
//! linked-account counts) to the fixed 20-field fraud vector. Several
//! flags are deliberately coarse proxies (the geo mismatch flag only
//! checks completeness of state/district, not actual consistency) and
//! the 3-month utility figures are extrapolated to 12 months by a
//! flat factor of 4.

use crate::models::{ApplicantProfile, FraudFeatureVector, LinkedAccountCounts};
use chrono::{DateTime, Timelike, Utc};

/// Recharge amounts differing by more than this many rupees between the
/// user declaration and the provider feed count as a mismatch.
const RECHARGE_MISMATCH_THRESHOLD: f64 = 500.0;

/// Outstanding electricity dues above this amount are treated as a
/// disconnection-risk signal.
const DISCONNECTION_OUTSTANDING_THRESHOLD: f64 = 1000.0;

/// Applications submitted in this local-hour window (inclusive) are
/// flagged as unusual.
const UNUSUAL_HOURS: (u32, u32) = (0, 5);

/// Timestamps are stored in UTC; the submission-hour check runs in
/// local time at this fixed offset (IST, UTC+05:30).
const LOCAL_OFFSET_MINUTES: u32 = 5 * 60 + 30;

fn local_hour(timestamp: DateTime<Utc>) -> u32 {
    let minutes =
        (timestamp.hour() * 60 + timestamp.minute() + LOCAL_OFFSET_MINUTES) % (24 * 60);
    minutes / 60
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A text field counts as missing when absent, empty, or one of the
/// known placeholder values.
fn str_missing(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed == "NA" || trimmed == "0"
        }
    }
}

fn num_missing_f64(value: Option<f64>) -> bool {
    !matches!(value, Some(v) if v != 0.0)
}

fn num_missing_i32(value: Option<i32>) -> bool {
    !matches!(value, Some(v) if v != 0)
}

/// Derive the fraud feature vector.
///
/// `linked` must be computed by the caller from beneficiary records
/// sharing the applicant's phone number and identity key; the mapper
/// writes the counts into the vector without further derivation.
pub fn map_fraud(
    profile: &ApplicantProfile,
    linked: LinkedAccountCounts,
    now: DateTime<Utc>,
) -> FraudFeatureVector {
    let beneficiary = profile.beneficiary.as_ref();
    let bank = profile.bank_details.as_ref();
    let ration = profile.ration_card.as_ref();
    let income = profile.income_asset.as_ref();
    let expenses = profile.expenses_and_commodities.as_ref();
    let elec = profile.electricity_bill.as_ref();
    let water = profile.water_bill.as_ref();

    let geo_location_mismatch_flag = i32::from(
        str_missing(beneficiary.and_then(|b| b.state.as_deref()))
            || str_missing(beneficiary.and_then(|b| b.district.as_deref())),
    );

    let sudden_consumption_drop_flag =
        i32::from(elec.and_then(|e| e.flag) == Some(1));

    let electricity_mismatch_flag = match (
        expenses.and_then(|e| e.elec_account_no.as_deref()),
        elec.and_then(|e| e.elec_account_no.as_deref()),
    ) {
        (Some(declared), Some(observed))
            if !declared.trim().is_empty() && !observed.trim().is_empty() =>
        {
            i32::from(declared != observed)
        }
        _ => 0,
    };

    let recharge_mismatch_flag = match (
        expenses.and_then(|e| e.user_provider_avg_recharge_amount),
        expenses.and_then(|e| e.api_provider_avg_recharge_amount),
    ) {
        (Some(user), Some(api)) => {
            i32::from((user - api).abs() > RECHARGE_MISMATCH_THRESHOLD)
        }
        _ => 0,
    };

    let earners = ration.and_then(|r| r.earners_cnt).unwrap_or(0);
    let dependents = ration.and_then(|r| r.dependents_cnt).unwrap_or(0);
    let household_data_mismatch_flag = match ration.and_then(|r| r.household_size) {
        Some(size) => i32::from(size != earners + dependents),
        // No declared size to reconcile against counts as a mismatch
        None => 1,
    };

    let annual_income = income.and_then(|i| i.annual_income);
    let category = ration.and_then(|r| r.ration_card_category.as_deref());
    let ration_category_mismatch = match (category, annual_income) {
        (Some("APL"), Some(income)) if income < 100_000.0 => 1,
        (Some("BPL"), Some(income)) if income > 200_000.0 => 1,
        _ => 0,
    };

    let bill_manipulation_flag = i32::from(
        matches!(elec.and_then(|e| e.elec_total_bills), Some(n) if n < 2)
            || matches!(water.and_then(|w| w.water_total_bills_3m), Some(n) if n < 2),
    );

    let applied_on = profile
        .track_application
        .as_ref()
        .and_then(|t| t.applied_on)
        .unwrap_or(now);
    let hour = local_hour(applied_on);
    let unusual_submission_time_flag =
        i32::from(hour >= UNUSUAL_HOURS.0 && hour <= UNUSUAL_HOURS.1);

    // Missing/placeholder values among the six critical identity and
    // bank fields.
    let critical_fields = [
        beneficiary.and_then(|b| b.full_name.as_deref()),
        beneficiary.and_then(|b| b.phone_no.as_deref()),
        beneficiary.and_then(|b| b.address.as_deref()),
        bank.and_then(|b| b.account_no.as_deref()),
        bank.and_then(|b| b.ifsc_code.as_deref()),
        ration.and_then(|r| r.ration_card_no.as_deref()),
    ];
    let field_edits = critical_fields.iter().filter(|f| str_missing(**f)).count() as i32;

    let elec_outstanding = elec
        .and_then(|e| e.elec_outstanding_amount_current)
        .unwrap_or(0.0);
    let water_outstanding = water
        .and_then(|w| w.water_outstanding_amt_current)
        .unwrap_or(0.0);

    let elec_any_disconnection_flag =
        i32::from(elec_outstanding > DISCONNECTION_OUTSTANDING_THRESHOLD);

    // 3-month figures extrapolated to a 12-month horizon
    let elec_total_delay_days_12m =
        elec.and_then(|e| e.elec_total_delay_days_3m).unwrap_or(0) * 4;
    let elec_on_time_bills_12m =
        elec.and_then(|e| e.elec_on_time_bills_3m).unwrap_or(0) * 4;

    let util_any_outstanding_flag =
        i32::from(elec_outstanding > 0.0 || water_outstanding > 0.0);
    let util_total_outstanding_12m = elec_outstanding + water_outstanding;

    let total_bills = elec.and_then(|e| e.elec_total_bills).unwrap_or(0)
        + water.and_then(|w| w.water_total_bills_3m).unwrap_or(0);
    let on_time_bills = elec.and_then(|e| e.elec_on_time_bills_3m).unwrap_or(0)
        + water.and_then(|w| w.water_on_time_bills_3m).unwrap_or(0);
    let util_on_time_ratio = if total_bills > 0 {
        round2(f64::from(on_time_bills) / f64::from(total_bills))
    } else {
        0.0
    };

    // Completeness across eight named fields; placeholders count as
    // missing.
    let missing_flags = [
        str_missing(beneficiary.and_then(|b| b.full_name.as_deref())),
        str_missing(beneficiary.and_then(|b| b.phone_no.as_deref())),
        str_missing(beneficiary.and_then(|b| b.address.as_deref())),
        str_missing(bank.and_then(|b| b.account_no.as_deref())),
        str_missing(ration.and_then(|r| r.ration_card_no.as_deref())),
        num_missing_f64(income.and_then(|i| i.monthly_income)),
        str_missing(elec.and_then(|e| e.elec_account_no.as_deref())),
        num_missing_i32(water.and_then(|w| w.water_total_bills_3m)),
    ];
    let completed = missing_flags.iter().filter(|m| !**m).count();
    let data_completeness_score =
        round2(completed as f64 / missing_flags.len() as f64 * 100.0);

    FraudFeatureVector {
        geo_location_mismatch_flag,
        sudden_consumption_drop_flag,
        electricity_mismatch_flag,
        recharge_mismatch_flag,
        household_data_mismatch_flag,
        ration_category_mismatch,
        bill_manipulation_flag,
        unusual_submission_time_flag,
        field_edits,
        // No client-side timing capture exists yet
        form_completion_time: 0,
        mobile_number_linked_accounts: linked.mobile,
        aadhaar_linked_accounts: linked.aadhaar,
        elec_any_disconnection_flag,
        elec_outstanding_amount_current: elec_outstanding,
        elec_total_delay_days_12m,
        elec_on_time_bills_12m,
        util_any_outstanding_flag,
        util_total_outstanding_12m,
        util_on_time_ratio,
        data_completeness_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BankDetails, Beneficiary, ElectricityBill, ExpensesAndCommodities, IncomeAsset,
        RationCard, TrackApplication, WaterBill,
    };
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap()
    }

    fn no_links() -> LinkedAccountCounts {
        LinkedAccountCounts::default()
    }

    #[test]
    fn geo_flag_set_when_state_or_district_missing() {
        let mut profile = ApplicantProfile {
            beneficiary: Some(Beneficiary {
                state: Some("Bihar".to_string()),
                district: Some("Patna".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            map_fraud(&profile, no_links(), fixed_now()).geo_location_mismatch_flag,
            0
        );

        profile.beneficiary.as_mut().unwrap().district = None;
        assert_eq!(
            map_fraud(&profile, no_links(), fixed_now()).geo_location_mismatch_flag,
            1
        );
    }

    #[test]
    fn electricity_account_mismatch_requires_both_values() {
        let mut profile = ApplicantProfile {
            expenses_and_commodities: Some(ExpensesAndCommodities {
                elec_account_no: Some("A1".to_string()),
                ..Default::default()
            }),
            electricity_bill: Some(ElectricityBill {
                elec_account_no: Some("A2".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            map_fraud(&profile, no_links(), fixed_now()).electricity_mismatch_flag,
            1
        );

        profile.electricity_bill.as_mut().unwrap().elec_account_no = None;
        assert_eq!(
            map_fraud(&profile, no_links(), fixed_now()).electricity_mismatch_flag,
            0
        );
    }

    #[test]
    fn recharge_mismatch_uses_absolute_threshold() {
        let mut profile = ApplicantProfile {
            expenses_and_commodities: Some(ExpensesAndCommodities {
                user_provider_avg_recharge_amount: Some(200.0),
                api_provider_avg_recharge_amount: Some(900.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            map_fraud(&profile, no_links(), fixed_now()).recharge_mismatch_flag,
            1
        );

        // Exactly at the threshold is not a mismatch
        profile
            .expenses_and_commodities
            .as_mut()
            .unwrap()
            .api_provider_avg_recharge_amount = Some(700.0);
        assert_eq!(
            map_fraud(&profile, no_links(), fixed_now()).recharge_mismatch_flag,
            0
        );
    }

    #[test]
    fn household_mismatch_compares_size_against_member_counts() {
        let mut profile = ApplicantProfile {
            ration_card: Some(RationCard {
                household_size: Some(5),
                earners_cnt: Some(2),
                dependents_cnt: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            map_fraud(&profile, no_links(), fixed_now()).household_data_mismatch_flag,
            0
        );

        profile.ration_card.as_mut().unwrap().household_size = Some(6);
        assert_eq!(
            map_fraud(&profile, no_links(), fixed_now()).household_data_mismatch_flag,
            1
        );
    }

    #[test]
    fn ration_category_mismatch_rules() {
        let profile = |category: &str, income: f64| ApplicantProfile {
            ration_card: Some(RationCard {
                ration_card_category: Some(category.to_string()),
                household_size: Some(1),
                ..Default::default()
            }),
            income_asset: Some(IncomeAsset {
                annual_income: Some(income),
                ..Default::default()
            }),
            ..Default::default()
        };

        // APL claiming low income
        let v = map_fraud(&profile("APL", 50_000.0), no_links(), fixed_now());
        assert_eq!(v.ration_category_mismatch, 1);

        // BPL claiming high income
        let v = map_fraud(&profile("BPL", 250_000.0), no_links(), fixed_now());
        assert_eq!(v.ration_category_mismatch, 1);

        // Consistent combinations
        let v = map_fraud(&profile("APL", 150_000.0), no_links(), fixed_now());
        assert_eq!(v.ration_category_mismatch, 0);
        let v = map_fraud(&profile("BPL", 80_000.0), no_links(), fixed_now());
        assert_eq!(v.ration_category_mismatch, 0);
    }

    #[test]
    fn submission_between_midnight_and_five_local_is_unusual() {
        let at_utc = |hour: u32, minute: u32| ApplicantProfile {
            track_application: Some(TrackApplication {
                applied_on: Some(Utc.with_ymd_and_hms(2025, 5, 1, hour, minute, 0).unwrap()),
                ..Default::default()
            }),
            ..Default::default()
        };

        // 21:30 UTC is 03:00 IST
        let v = map_fraud(&at_utc(21, 30), no_links(), fixed_now());
        assert_eq!(v.unusual_submission_time_flag, 1);
        // 23:30 UTC is 05:00 IST, still inside the window
        let v = map_fraud(&at_utc(23, 30), no_links(), fixed_now());
        assert_eq!(v.unusual_submission_time_flag, 1);
        // 18:30 UTC is exactly local midnight
        let v = map_fraud(&at_utc(18, 30), no_links(), fixed_now());
        assert_eq!(v.unusual_submission_time_flag, 1);
        // 03:30 UTC is 09:00 IST, a normal morning submission
        let v = map_fraud(&at_utc(3, 30), no_links(), fixed_now());
        assert_eq!(v.unusual_submission_time_flag, 0);
        // 03:00 UTC would be flagged if the check ran in UTC; 08:30 IST is not
        let v = map_fraud(&at_utc(3, 0), no_links(), fixed_now());
        assert_eq!(v.unusual_submission_time_flag, 0);
    }

    #[test]
    fn field_edits_count_placeholder_values() {
        let profile = ApplicantProfile {
            beneficiary: Some(Beneficiary {
                full_name: Some("Asha Devi".to_string()),
                phone_no: Some("NA".to_string()),
                address: Some("".to_string()),
                ..Default::default()
            }),
            bank_details: Some(BankDetails {
                account_no: Some("0".to_string()),
                ifsc_code: Some("SBIN0001234".to_string()),
                ..Default::default()
            }),
            // ration_card_no missing entirely
            ..Default::default()
        };
        // phone "NA", address "", account "0", ration card missing = 4
        let v = map_fraud(&profile, no_links(), fixed_now());
        assert_eq!(v.field_edits, 4);
    }

    #[test]
    fn linked_account_counts_pass_through() {
        let linked = LinkedAccountCounts {
            mobile: 3,
            aadhaar: 2,
        };
        let v = map_fraud(&ApplicantProfile::default(), linked, fixed_now());
        assert_eq!(v.mobile_number_linked_accounts, 3);
        assert_eq!(v.aadhaar_linked_accounts, 2);
    }

    #[test]
    fn utility_fields_default_to_zero_when_bills_missing() {
        let v = map_fraud(&ApplicantProfile::default(), no_links(), fixed_now());
        assert_eq!(v.elec_any_disconnection_flag, 0);
        assert_eq!(v.elec_outstanding_amount_current, 0.0);
        assert_eq!(v.elec_total_delay_days_12m, 0);
        assert_eq!(v.elec_on_time_bills_12m, 0);
        assert_eq!(v.util_any_outstanding_flag, 0);
        assert_eq!(v.util_total_outstanding_12m, 0.0);
        assert_eq!(v.util_on_time_ratio, 0.0);
        assert_eq!(v.bill_manipulation_flag, 0);
    }

    #[test]
    fn three_month_figures_extrapolate_by_four() {
        let profile = ApplicantProfile {
            electricity_bill: Some(ElectricityBill {
                elec_total_delay_days_3m: Some(5),
                elec_on_time_bills_3m: Some(2),
                elec_outstanding_amount_current: Some(1500.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let v = map_fraud(&profile, no_links(), fixed_now());
        assert_eq!(v.elec_total_delay_days_12m, 20);
        assert_eq!(v.elec_on_time_bills_12m, 8);
        assert_eq!(v.elec_any_disconnection_flag, 1);
    }

    #[test]
    fn completeness_score_over_eight_fields() {
        let profile = ApplicantProfile {
            beneficiary: Some(Beneficiary {
                full_name: Some("Asha Devi".to_string()),
                phone_no: Some("9876543210".to_string()),
                address: Some("Ward 4".to_string()),
                ..Default::default()
            }),
            bank_details: Some(BankDetails {
                account_no: Some("123456".to_string()),
                ..Default::default()
            }),
            // remaining four fields missing
            ..Default::default()
        };
        let v = map_fraud(&profile, no_links(), fixed_now());
        assert_eq!(v.data_completeness_score, 50.0);
    }

    #[test]
    fn on_time_ratio_rounds_to_two_decimals() {
        let profile = ApplicantProfile {
            electricity_bill: Some(ElectricityBill {
                elec_total_bills: Some(3),
                elec_on_time_bills_3m: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };
        let v = map_fraud(&profile, no_links(), fixed_now());
        assert_eq!(v.util_on_time_ratio, 0.33);
    }

    #[test]
    fn mapping_is_idempotent_for_a_fixed_clock() {
        let profile = ApplicantProfile {
            beneficiary: Some(Beneficiary {
                state: Some("Bihar".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let now = fixed_now();
        let linked = LinkedAccountCounts { mobile: 1, aadhaar: 1 };
        assert_eq!(
            map_fraud(&profile, linked, now),
            map_fraud(&profile, linked, now)
        );
    }
}
