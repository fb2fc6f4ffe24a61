//! Socio-economic need feature derivation.
//!
//! Pure mapping from the merged profile to the fixed 26-field need
//! vector. Household counts undergo two documented repairs before any
//! ratio is computed: at least one earner is assumed, and household
//! size is forced above the earner count so the dependency ratio stays
//! meaningful. The SECC deprivation indicator is a one-hot encoding
//! selected by a fixed priority list.

use crate::models::{ApplicantProfile, NeedFeatureVector};

/// Flat per-unit electricity cost assumed when estimating monthly
/// consumption from the average bill amount.
const RUPEES_PER_UNIT: f64 = 7.0;

fn yes_no(value: bool) -> String {
    if value { "YES" } else { "NO" }.to_string()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derive the need feature vector.
pub fn map_need(profile: &ApplicantProfile) -> NeedFeatureVector {
    let ration = profile.ration_card.as_ref();
    let status = profile.beneficiary_status.as_ref();
    let income = profile.income_asset.as_ref();
    let elec = profile.electricity_bill.as_ref();
    let expenses = profile.expenses_and_commodities.as_ref();
    let water = profile.water_bill.as_ref();

    let dependents_cnt = ration.and_then(|r| r.dependents_cnt).unwrap_or(0).max(0);

    // A household has at least one earner for ratio purposes.
    let earners_cnt = ration.and_then(|r| r.earners_cnt).unwrap_or(1).max(1);

    // Household size must exceed the earner count; repaired here rather
    // than rejected so a single bad census row does not block scoring.
    let mut household_size = ration.and_then(|r| r.household_size).unwrap_or(0);
    if household_size <= earners_cnt {
        household_size = earners_cnt + 1;
    }

    let dependency_ratio = round2(f64::from(dependents_cnt) / f64::from(earners_cnt));

    let ration_card_category = ration
        .and_then(|r| r.ration_card_category.clone())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let mgnrega = status.and_then(|s| s.mgnrega).unwrap_or(false);
    let ujjwala = status.and_then(|s| s.pm_ujjwala_yojana).unwrap_or(false);
    let pmjay = status.and_then(|s| s.pm_jay).unwrap_or(false);
    let pension = status
        .and_then(|s| s.enrolled_in_pension_scheme)
        .unwrap_or(false);
    let has_any_scheme = mgnrega || ujjwala || pmjay || pension;

    let asset_count = income.and_then(|i| i.asset_count).unwrap_or(0);

    let avg_bill = elec.and_then(|e| e.elec_avg_bill_amt_3m).unwrap_or(0.0);
    let avg_monthly_electricity_units = if avg_bill > 0.0 {
        (avg_bill / RUPEES_PER_UNIT).floor() as i32
    } else {
        0
    };

    // User-declared values win over provider-observed ones.
    let avg_mobile_recharge = expenses
        .and_then(|e| {
            e.user_provider_avg_recharge_amount
                .or(e.api_provider_avg_recharge_amount)
        })
        .unwrap_or(0.0);

    let lpg_refills_3month = expenses
        .and_then(|e| e.user_refills_in_last_3m.or(e.provider_refills_in_last_3m))
        .unwrap_or(0);

    let avg_monthly_gas_refill_cost = expenses
        .and_then(|e| e.user_average_refill_cost.or(e.provider_average_refill_cost))
        .unwrap_or(0.0);

    let lpg_avg_refill_interval_days = expenses
        .and_then(|e| {
            e.user_average_refill_interval_days
                .or(e.provider_average_refill_interval_days)
        })
        .unwrap_or(0.0);

    // SECC deprivation criteria in priority order; the first true entry
    // sets the single output bit, D1 is forced when none hold.
    let criteria = [
        ration_card_category == "BPL",              // D1
        earners_cnt == 1 && dependents_cnt > 0,     // D2
        !mgnrega,                                   // D3
        asset_count == 0,                           // D4
        avg_mobile_recharge < 100.0,                // D5
        avg_bill < 500.0,                           // D6
        dependency_ratio > 0.5,                     // D7
    ];
    let chosen = criteria.iter().position(|&met| met).unwrap_or(0);
    let mut secc = [0i32; 7];
    secc[chosen] = 1;

    NeedFeatureVector {
        household_size,
        household_dependents_count: dependents_cnt,
        earners_cnt,
        dependency_ratio,
        ration_card_category,
        govt_scheme_eligibility_flag: yes_no(has_any_scheme),
        enrolled_mgnrega_flag: yes_no(mgnrega),
        enrolled_ujjwala_flag: yes_no(ujjwala),
        enrolled_pmjay_flag: yes_no(pmjay),
        enrolled_pension_flag: yes_no(pension),
        asset_count,
        asset_value_estimate: income.and_then(|i| i.estimated_asset_value).unwrap_or(0.0),
        household_income_self_declared: income.and_then(|i| i.monthly_income).unwrap_or(0.0),
        avg_monthly_electricity_units,
        avg_mobile_recharge_amount: avg_mobile_recharge,
        avg_monthly_water_bill: water
            .and_then(|w| w.water_outstanding_amt_current)
            .unwrap_or(0.0),
        avg_monthly_gas_refill_cost,
        lpg_refills_3month,
        lpg_avg_refill_interval_days,
        secc_d1: secc[0],
        secc_d2: secc[1],
        secc_d3: secc[2],
        secc_d4: secc[3],
        secc_d5: secc[4],
        secc_d6: secc[5],
        secc_d7: secc[6],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BeneficiaryStatus, ElectricityBill, ExpensesAndCommodities, IncomeAsset, RationCard,
    };

    fn secc_bits(vector: &NeedFeatureVector) -> [i32; 7] {
        [
            vector.secc_d1,
            vector.secc_d2,
            vector.secc_d3,
            vector.secc_d4,
            vector.secc_d5,
            vector.secc_d6,
            vector.secc_d7,
        ]
    }

    #[test]
    fn earners_floor_at_one() {
        let profile = ApplicantProfile {
            ration_card: Some(RationCard {
                earners_cnt: Some(0),
                dependents_cnt: Some(2),
                ..Default::default()
            }),
            ..Default::default()
        };
        let vector = map_need(&profile);
        assert_eq!(vector.earners_cnt, 1);
        assert_eq!(vector.dependency_ratio, 2.0);
    }

    #[test]
    fn household_size_forced_above_earners() {
        let profile = ApplicantProfile {
            ration_card: Some(RationCard {
                household_size: Some(2),
                earners_cnt: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        };
        let vector = map_need(&profile);
        assert_eq!(vector.earners_cnt, 3);
        assert_eq!(vector.household_size, 4);
        assert!(vector.household_size > vector.earners_cnt);
    }

    #[test]
    fn dependency_ratio_rounds_to_two_decimals() {
        let profile = ApplicantProfile {
            ration_card: Some(RationCard {
                earners_cnt: Some(3),
                dependents_cnt: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(map_need(&profile).dependency_ratio, 0.33);
    }

    #[test]
    fn bpl_category_has_top_secc_priority() {
        let profile = ApplicantProfile {
            ration_card: Some(RationCard {
                ration_card_category: Some("BPL".to_string()),
                earners_cnt: Some(1),
                dependents_cnt: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };
        let vector = map_need(&profile);
        assert_eq!(secc_bits(&vector), [1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn single_earner_with_dependents_selects_d2() {
        let profile = ApplicantProfile {
            ration_card: Some(RationCard {
                ration_card_category: Some("APL".to_string()),
                earners_cnt: Some(1),
                dependents_cnt: Some(2),
                ..Default::default()
            }),
            ..Default::default()
        };
        let vector = map_need(&profile);
        assert_eq!(secc_bits(&vector), [0, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn exactly_one_secc_bit_is_always_set() {
        // No criterion true: APL, multiple earners, MGNREGA enrolled,
        // assets present, high recharge, high bill, low dependency.
        let profile = ApplicantProfile {
            ration_card: Some(RationCard {
                ration_card_category: Some("APL".to_string()),
                household_size: Some(6),
                earners_cnt: Some(4),
                dependents_cnt: Some(1),
                ..Default::default()
            }),
            beneficiary_status: Some(BeneficiaryStatus {
                mgnrega: Some(true),
                ..Default::default()
            }),
            income_asset: Some(IncomeAsset {
                asset_count: Some(2),
                ..Default::default()
            }),
            expenses_and_commodities: Some(ExpensesAndCommodities {
                user_provider_avg_recharge_amount: Some(300.0),
                ..Default::default()
            }),
            electricity_bill: Some(ElectricityBill {
                elec_avg_bill_amt_3m: Some(900.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let vector = map_need(&profile);
        // Fallback forces D1 when nothing matches
        assert_eq!(secc_bits(&vector), [1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(secc_bits(&vector).iter().sum::<i32>(), 1);
    }

    #[test]
    fn electricity_units_extrapolate_from_bill_amount() {
        let profile = ApplicantProfile {
            electricity_bill: Some(ElectricityBill {
                elec_avg_bill_amt_3m: Some(700.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(map_need(&profile).avg_monthly_electricity_units, 100);
    }

    #[test]
    fn scheme_flags_roll_up_to_eligibility() {
        let profile = ApplicantProfile {
            beneficiary_status: Some(BeneficiaryStatus {
                pm_jay: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let vector = map_need(&profile);
        assert_eq!(vector.govt_scheme_eligibility_flag, "YES");
        assert_eq!(vector.enrolled_pmjay_flag, "YES");
        assert_eq!(vector.enrolled_mgnrega_flag, "NO");
    }

    #[test]
    fn user_declared_expense_values_win_over_provider() {
        let profile = ApplicantProfile {
            expenses_and_commodities: Some(ExpensesAndCommodities {
                user_provider_avg_recharge_amount: Some(150.0),
                api_provider_avg_recharge_amount: Some(250.0),
                provider_refills_in_last_3m: Some(2),
                ..Default::default()
            }),
            ..Default::default()
        };
        let vector = map_need(&profile);
        assert_eq!(vector.avg_mobile_recharge_amount, 150.0);
        assert_eq!(vector.lpg_refills_3month, 2);
    }

    #[test]
    fn empty_profile_still_yields_full_schema() {
        let vector = map_need(&ApplicantProfile::default());
        assert_eq!(vector.ration_card_category, "UNKNOWN");
        assert_eq!(vector.earners_cnt, 1);
        assert!(vector.household_size > vector.earners_cnt);
        assert_eq!(secc_bits(&vector).iter().sum::<i32>(), 1);
    }

    #[test]
    fn mapping_is_idempotent() {
        let profile = ApplicantProfile {
            ration_card: Some(RationCard {
                ration_card_category: Some("BPL".to_string()),
                household_size: Some(5),
                earners_cnt: Some(2),
                dependents_cnt: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(map_need(&profile), map_need(&profile));
    }
}
