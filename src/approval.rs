//! Deterministic heuristic scoring for the admin review lists, plus the
//! EMI calculation used when sanctioning a loan.
//!
//! These are display heuristics only; the real model calls live in the
//! scoring orchestrators. Everything here is pure and clock-free.

use crate::models::HeuristicScores;

/// Ordered band-classification table. Evaluated top-down, first match
/// wins; scores below every threshold fall through to `BAND_FALLBACK`.
const BAND_TABLE: [(f64, &str); 3] = [
    (0.80, "Low Risk - High Need"),
    (0.60, "Medium Risk - High Need"),
    (0.45, "High Risk - Medium Need"),
];

const BAND_FALLBACK: &str = "High Risk - Low Need";

/// Convert a stored text amount ("₹1,50,000", "50000.50") to a number.
/// Non-numeric characters are stripped; unparseable values become 0.
pub fn parse_amount(value: Option<&str>) -> f64 {
    let Some(raw) = value else { return 0.0 };
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Map a continuous eligibility score to a human-readable band label.
pub fn classify_band(score: f64) -> &'static str {
    BAND_TABLE
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, label)| *label)
        .unwrap_or(BAND_FALLBACK)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the heuristic score summary for an application row.
///
/// `amount` is the applied amount for pending/rejected rows and the
/// sanctioned amount for approved rows; `tenure` is in months.
pub fn heuristic_scores(amount: f64, tenure: i32) -> HeuristicScores {
    let normalized_amount = (amount / 200_000.0).min(1.0);

    let need_score = 0.6 + 0.3 * (1.0 - normalized_amount);
    let risk_score = 0.25 + 0.5 * normalized_amount;
    let fraud_probability = 0.02 + 0.05 * normalized_amount;
    let credit_score = (750.0 - normalized_amount * 150.0).round() as i32;

    let final_score = 0.7 * (1.0 - risk_score) + 0.3 * need_score - fraud_probability;
    let final_eligibility_score = final_score.clamp(0.30, 0.95);

    HeuristicScores {
        credit_score,
        risk_score: round2(risk_score),
        fraud_probability: round2(fraud_probability),
        need_score: round2(need_score),
        estimated_income: 30_000.0 + f64::from(tenure) * 500.0,
        estimated_safe_loan: amount + 20_000.0,
        band_classification: classify_band(final_eligibility_score).to_string(),
        final_eligibility_score: round2(final_eligibility_score),
    }
}

/// Standard amortized EMI, rounded to whole currency units.
///
/// P = principal, annual_rate in percent, months = tenure. Returns 0 if
/// any input is zero or non-finite, matching the sanction form's
/// expectations.
pub fn calculate_emi(principal: f64, annual_rate: f64, months: i32) -> f64 {
    let p = principal;
    let n = f64::from(months);
    let r = annual_rate / 12.0 / 100.0;

    if p == 0.0 || n == 0.0 || r == 0.0 || !p.is_finite() || !r.is_finite() {
        return 0.0;
    }

    let power = (r + 1.0).powf(n);
    let emi = (p * r * power) / (power - 1.0);
    emi.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_strips_currency_formatting() {
        assert_eq!(parse_amount(Some("₹1,50,000")), 150000.0);
        assert_eq!(parse_amount(Some("50000.50")), 50000.50);
        assert_eq!(parse_amount(Some("not a number")), 0.0);
        assert_eq!(parse_amount(Some("")), 0.0);
        assert_eq!(parse_amount(None), 0.0);
    }

    #[test]
    fn band_thresholds_first_match_wins() {
        assert_eq!(classify_band(0.95), "Low Risk - High Need");
        assert_eq!(classify_band(0.80), "Low Risk - High Need");
        assert_eq!(classify_band(0.79), "Medium Risk - High Need");
        assert_eq!(classify_band(0.60), "Medium Risk - High Need");
        assert_eq!(classify_band(0.59), "High Risk - Medium Need");
        assert_eq!(classify_band(0.45), "High Risk - Medium Need");
        assert_eq!(classify_band(0.44), "High Risk - Low Need");
        assert_eq!(classify_band(0.0), "High Risk - Low Need");
    }

    #[test]
    fn heuristic_scores_are_deterministic_and_clamped() {
        let a = heuristic_scores(50_000.0, 24);
        let b = heuristic_scores(50_000.0, 24);
        assert_eq!(a, b);
        assert!(a.final_eligibility_score >= 0.30);
        assert!(a.final_eligibility_score <= 0.95);
        assert_eq!(a.estimated_income, 42_000.0);
        assert_eq!(a.estimated_safe_loan, 70_000.0);
    }

    #[test]
    fn heuristic_scores_cap_normalized_amount() {
        // Anything at or above 2 lakh normalizes to 1.0
        let high = heuristic_scores(1_000_000.0, 12);
        let cap = heuristic_scores(200_000.0, 12);
        assert_eq!(high.risk_score, cap.risk_score);
        assert_eq!(high.credit_score, 600);
    }

    #[test]
    fn emi_matches_amortization_formula() {
        // 100000 at 12% annual over 12 months
        assert_eq!(calculate_emi(100_000.0, 12.0, 12), 8885.0);
        // 50000 at 10% annual over 24 months
        assert_eq!(calculate_emi(50_000.0, 10.0, 24), 2307.0);
    }

    #[test]
    fn emi_zero_inputs_return_zero() {
        assert_eq!(calculate_emi(0.0, 12.0, 12), 0.0);
        assert_eq!(calculate_emi(100_000.0, 0.0, 12), 0.0);
        assert_eq!(calculate_emi(100_000.0, 12.0, 0), 0.0);
    }
}
