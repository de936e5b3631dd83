use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::interest::days_past;

/// pending balance of a lump-sum loan
#[derive(Debug, Clone, PartialEq)]
pub struct LumpSumPending {
    /// amount owed now; zero once settled
    pub pending_amount: Money,
    /// principal plus one period of interest
    pub monthly_amount: Money,
    /// number of monthly amounts still open
    pub pending_periods: u32,
    /// periods elapsed since the due date, counting the due period itself
    pub periods_overdue: u32,
    /// what should have been paid by today
    pub total_owed: Money,
    pub settled: bool,
}

/// lump-sum pending calculation over fixed-length periods
///
/// The principal is never amortized: every elapsed period after the due date
/// owes another full principal plus interest, and only the sum of all payments
/// is credited against that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LumpSumCalculator {
    pub period_days: u32,
}

impl Default for LumpSumCalculator {
    fn default() -> Self {
        Self { period_days: 30 }
    }
}

impl LumpSumCalculator {
    pub fn new(period_days: u32) -> Self {
        Self {
            period_days: period_days.max(1),
        }
    }

    pub fn compute(
        &self,
        principal: Money,
        monthly_rate: Rate,
        loan_date: NaiveDate,
        due_date: Option<NaiveDate>,
        total_paid: Money,
        today: NaiveDate,
    ) -> LumpSumPending {
        let monthly_amount = principal + principal.times_rate(monthly_rate);

        let due = match due_date {
            Some(due) if today >= due => due,
            Some(_) => return Self::not_yet_due(monthly_amount),
            None => {
                tracing::debug!(%loan_date, "lump-sum loan without due date treated as not yet due");
                return Self::not_yet_due(monthly_amount);
            }
        };

        let months_overdue = days_past(due, today) / self.period_days.max(1);
        let periods_overdue = months_overdue + 1;
        let total_owed = monthly_amount * Decimal::from(periods_overdue);
        let residual = total_owed - total_paid.non_negative();

        if total_owed.is_positive() && !residual.is_positive() {
            return LumpSumPending {
                pending_amount: Money::ZERO,
                monthly_amount,
                pending_periods: 0,
                periods_overdue,
                total_owed,
                settled: true,
            };
        }

        let pending_amount = monthly_amount.max(residual);
        let pending_periods = if monthly_amount.is_positive() {
            (pending_amount.as_decimal() / monthly_amount.as_decimal())
                .ceil()
                .to_u32()
                .unwrap_or(1)
        } else {
            1
        };

        LumpSumPending {
            pending_amount,
            monthly_amount,
            pending_periods,
            periods_overdue,
            total_owed,
            settled: false,
        }
    }

    fn not_yet_due(monthly_amount: Money) -> LumpSumPending {
        LumpSumPending {
            pending_amount: monthly_amount,
            monthly_amount,
            pending_periods: 1,
            periods_overdue: 0,
            total_owed: monthly_amount,
            settled: false,
        }
    }
}

/// pending balance of a lump-sum loan with 30-day periods
pub fn compute_lump_sum_pending(
    principal: Money,
    monthly_rate: Rate,
    loan_date: NaiveDate,
    due_date: Option<NaiveDate>,
    total_paid: Money,
    today: NaiveDate,
) -> LumpSumPending {
    LumpSumCalculator::default().compute(principal, monthly_rate, loan_date, due_date, total_paid, today)
}
