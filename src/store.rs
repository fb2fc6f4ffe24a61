//! All store access for the scoring and review workflows.
//!
//! Every section query selects an explicit column list that excludes
//! the identifier and audit columns (`aadhar_no` / `aadhaar_no`,
//! `loan_application_id`, `created_at`, `updated_at`; both spellings
//! of the ID column exist in the legacy schema), so stripped fields
//! never reach the merged profile. One-to-many sections are reduced to
//! the most recent row by `created_at`; the legacy store relied on
//! undefined default ordering here, so this is a deliberate,
//! documented tie-break.

use crate::errors::AppError;
use crate::history::LoanHistoryRow;
use crate::models::*;
use sqlx::PgPool;

pub struct ProfileStore {
    pool: PgPool,
}

impl ProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve the identity key (Aadhaar) for an application id.
    pub async fn identity_for_application(
        &self,
        loan_id: &str,
    ) -> Result<Option<String>, AppError> {
        let aadhar = sqlx::query_scalar::<_, String>(
            "SELECT aadhar_no FROM track_application
             WHERE loan_application_id = $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(loan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(aadhar)
    }

    pub async fn loan_application(
        &self,
        loan_id: &str,
        aadhar: &str,
    ) -> Result<Option<LoanApplication>, AppError> {
        let row = sqlx::query_as::<_, LoanApplication>(
            "SELECT applicant_name, phone_no, scheme, loan_amount, status
             FROM loan_applications
             WHERE loan_application_id = $1 AND aadhaar_no = $2
             LIMIT 1",
        )
        .bind(loan_id)
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn beneficiary(&self, aadhar: &str) -> Result<Option<Beneficiary>, AppError> {
        let row = sqlx::query_as::<_, Beneficiary>(
            "SELECT full_name, phone_no, address, state, district, pincode
             FROM beneficiary
             WHERE aadhar_no = $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn apply_for_loan(
        &self,
        loan_id: &str,
        aadhar: &str,
    ) -> Result<Option<ApplyForLoan>, AppError> {
        let row = sqlx::query_as::<_, ApplyForLoan>(
            "SELECT purpose_of_loan, interest_rate, emi_amount
             FROM apply_for_loan
             WHERE loan_application_id = $1 AND aadhaar_no = $2
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(loan_id)
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn track_application(
        &self,
        loan_id: &str,
        aadhar: &str,
    ) -> Result<Option<TrackApplication>, AppError> {
        let row = sqlx::query_as::<_, TrackApplication>(
            "SELECT applied_on, loan_amount_applied, loan_amount_approved,
                    tenure_applied, tenure_approved, interest_rate, emi_amount,
                    scheme, status
             FROM track_application
             WHERE loan_application_id = $1 AND aadhar_no = $2
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(loan_id)
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn bank_details(
        &self,
        loan_id: &str,
        aadhar: &str,
    ) -> Result<Option<BankDetails>, AppError> {
        let row = sqlx::query_as::<_, BankDetails>(
            "SELECT bank_name, account_no, ifsc_code, branch
             FROM bank_details
             WHERE loan_application_id = $1 AND aadhaar_no = $2
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(loan_id)
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn expenses_and_commodities(
        &self,
        loan_id: &str,
        aadhar: &str,
    ) -> Result<Option<ExpensesAndCommodities>, AppError> {
        // Legacy table name keeps its original spelling
        let row = sqlx::query_as::<_, ExpensesAndCommodities>(
            "SELECT elec_account_no,
                    user_provider_avg_recharge_amount, api_provider_avg_recharge_amount,
                    user_refills_in_last_3m, provider_refills_in_last_3m,
                    user_average_refill_cost, provider_average_refill_cost,
                    user_average_refill_interval_days, provider_average_refill_interval_days
             FROM expenses_and_comodities
             WHERE loan_application_id = $1 AND aadhar_no = $2
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(loan_id)
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn income_asset(
        &self,
        loan_id: &str,
        aadhar: &str,
    ) -> Result<Option<IncomeAsset>, AppError> {
        let row = sqlx::query_as::<_, IncomeAsset>(
            "SELECT monthly_income, annual_income, asset_count, estimated_asset_value
             FROM income_asset
             WHERE loan_application_id = $1 AND aadhar_no = $2
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(loan_id)
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn beneficiary_status(
        &self,
        loan_id: &str,
        aadhar: &str,
    ) -> Result<Option<BeneficiaryStatus>, AppError> {
        let row = sqlx::query_as::<_, BeneficiaryStatus>(
            "SELECT mgnrega, pm_ujjwala_yojana, pm_jay, enrolled_in_pension_scheme
             FROM beneficiary_status
             WHERE loan_application_id = $1 AND aadhaar_no = $2
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(loan_id)
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn electricity_bill(
        &self,
        aadhar: &str,
    ) -> Result<Option<ElectricityBill>, AppError> {
        let row = sqlx::query_as::<_, ElectricityBill>(
            "SELECT elec_account_no, elec_total_bills, elec_on_time_bills_3m,
                    elec_total_delay_days_3m, elec_max_delay_days_3m,
                    elec_outstanding_amount_current, elec_avg_bill_amt_3m, flag
             FROM electricity_bill
             WHERE aadhar_no = $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn water_bill(&self, aadhar: &str) -> Result<Option<WaterBill>, AppError> {
        let row = sqlx::query_as::<_, WaterBill>(
            "SELECT water_total_bills_3m, water_on_time_bills_3m,
                    water_total_delay_days_3m, water_max_delay_days_3m,
                    water_outstanding_amt_current
             FROM water_bill
             WHERE aadhar_no = $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Ration cards store only a masked identifier, so the join matches
    /// the last four characters of the identity key. Intentionally
    /// coarse; first match wins.
    pub async fn ration_card(&self, aadhar: &str) -> Result<Option<RationCard>, AppError> {
        let suffix_start = aadhar.len().saturating_sub(4);
        let suffix = &aadhar[suffix_start..];

        let row = sqlx::query_as::<_, RationCard>(
            "SELECT ration_card_no, ration_card_category, household_size,
                    earners_cnt, dependents_cnt
             FROM ration_card
             WHERE aadhar_no_masked LIKE '%' || $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(suffix)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Number of tracking records sharing the identity key. Includes
    /// the current application, matching how the repeat-borrower signal
    /// has always been computed.
    pub async fn prior_application_count(&self, aadhar: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM track_application WHERE aadhar_no = $1",
        )
        .bind(aadhar)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Beneficiary records sharing the applicant's phone number and
    /// identity key, for the fraud mapper.
    pub async fn linked_account_counts(
        &self,
        aadhar: &str,
    ) -> Result<LinkedAccountCounts, AppError> {
        let phone = sqlx::query_scalar::<_, Option<String>>(
            "SELECT phone_no FROM beneficiary
             WHERE aadhar_no = $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(aadhar)
        .fetch_optional(&self.pool)
        .await?
        .flatten();

        let mobile = match phone {
            Some(phone_no) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM beneficiary WHERE phone_no = $1",
                )
                .bind(&phone_no)
                .fetch_one(&self.pool)
                .await?
            }
            None => 0,
        };

        let aadhaar = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM beneficiary WHERE aadhar_no = $1",
        )
        .bind(aadhar)
        .fetch_one(&self.pool)
        .await?;

        Ok(LinkedAccountCounts {
            mobile: mobile as i32,
            aadhaar: aadhaar as i32,
        })
    }

    // ---- Admin review workflow ----

    /// Tracking rows with the given workflow status, newest first.
    pub async fn applications_by_status(
        &self,
        status: &str,
    ) -> Result<Vec<TrackedApplicationSummary>, AppError> {
        let rows = sqlx::query_as::<_, TrackedApplicationSummary>(
            "SELECT loan_application_id, applied_on, loan_amount_applied, scheme,
                    tenure_applied, status, aadhar_no, interest_rate, emi_amount
             FROM track_application
             WHERE status = $1
             ORDER BY applied_on DESC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Latest loan-history row per loan id, for the approved list.
    pub async fn latest_loan_history(&self) -> Result<Vec<LoanHistorySummary>, AppError> {
        let rows = sqlx::query_as::<_, LoanHistorySummary>(
            "SELECT DISTINCT ON (loan_id)
                    loan_id, payment_timestamp, loan_amount_sanctioned,
                    loan_amount_disbursed, loan_tenure_months, interest_rate,
                    emi_amount, aadhar_no
             FROM loan_history
             ORDER BY loan_id, payment_timestamp DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Scheme names for a set of loan ids, from the tracking table.
    pub async fn schemes_for_loans(
        &self,
        loan_ids: &[String],
    ) -> Result<Vec<(String, Option<String>)>, AppError> {
        if loan_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, (String, Option<String>)>(
            "SELECT loan_application_id, scheme
             FROM track_application
             WHERE loan_application_id = ANY($1)",
        )
        .bind(loan_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Mark an application approved and record the sanctioned terms.
    /// Returns the number of updated rows (0 means no matching record).
    pub async fn approve_application(
        &self,
        loan_id: &str,
        aadhar: &str,
        sanctioned_amount: f64,
        tenure_approved: i32,
        interest_rate: f64,
        emi_amount: f64,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE track_application
             SET status = 'APPROVED',
                 loan_amount_approved = $3,
                 tenure_approved = $4,
                 interest_rate = $5,
                 emi_amount = $6
             WHERE loan_application_id = $1 AND aadhar_no = $2",
        )
        .bind(loan_id)
        .bind(aadhar)
        // loan_amount_approved is a legacy text column
        .bind(sanctioned_amount.to_string())
        .bind(tenure_approved)
        .bind(interest_rate)
        .bind(emi_amount)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Set the workflow status (REJECTED / MANUAL_REVIEW).
    pub async fn update_application_status(
        &self,
        loan_id: &str,
        aadhar: &str,
        status: &str,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE track_application
             SET status = $3
             WHERE loan_application_id = $1 AND aadhar_no = $2",
        )
        .bind(loan_id)
        .bind(aadhar)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Append validated loan-history rows. Runs in a single transaction
    /// so a malformed timestamp rejects the whole batch.
    pub async fn insert_loan_history(&self, rows: &[LoanHistoryRow]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for row in rows {
            let result = sqlx::query(
                "INSERT INTO loan_history (
                     loan_id, payment_timestamp, aadhar_no,
                     loan_amount_sanctioned, loan_amount_disbursed,
                     loan_tenure_months, interest_rate, emi_amount,
                     repayments_made, total_amount_repaid, last_payment_date,
                     dpd_days, default_flag, npa_status, repeat_borrower_flag,
                     previous_loans_count, previous_defaults_count
                 ) VALUES ($1, $2::timestamptz, $3, $4, $5, $6, $7, $8, $9, $10,
                           $11::date, $12, $13, $14, $15, $16, $17)",
            )
            .bind(&row.loan_id)
            .bind(&row.payment_timestamp)
            .bind(&row.aadhar_no)
            .bind(row.loan_amount_sanctioned)
            .bind(row.loan_amount_disbursed)
            .bind(row.loan_tenure_months)
            .bind(row.interest_rate)
            .bind(row.emi_amount)
            .bind(row.repayments_made)
            .bind(row.total_amount_repaid)
            .bind(&row.last_payment_date)
            .bind(row.dpd_days)
            .bind(row.default_flag)
            .bind(row.npa_status)
            .bind(row.repeat_borrower_flag)
            .bind(row.previous_loans_count)
            .bind(row.previous_defaults_count)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
