use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::payments::PaymentHistory;
use crate::state::{BillingPeriod, Loan, Payment};
use crate::types::PeriodStatus;

/// what was expected and received for one month/year bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingPeriodSummary {
    pub period: BillingPeriod,
    pub expected: Money,
    pub paid: Money,
    /// expected minus paid, negative when overpaid
    pub difference: Money,
    pub status: PeriodStatus,
    pub last_payment_on: Option<NaiveDate>,
}

/// amount expected in each billing period
///
/// Installment loans expect one installment per month; lump-sum loans expect the
/// month's interest.
pub fn expected_per_period(loan: &Loan) -> Money {
    match &loan.installment_plan {
        Some(plan) => plan.amount,
        None => loan.principal.times_rate(loan.monthly_rate),
    }
}

/// month-by-month breakdown from the loan month through the month of `today`
///
/// Only payments attributed to a period are counted; the accrual formulas never
/// read these buckets.
pub fn billing_periods(loan: &Loan, payments: &[Payment], today: NaiveDate) -> Vec<BillingPeriodSummary> {
    let history = PaymentHistory::for_loan(loan.id, payments);
    let expected = expected_per_period(loan);
    let last = BillingPeriod::of(today);

    let mut summaries = Vec::new();
    let mut period = BillingPeriod::of(loan.loan_date);
    while period <= last {
        let paid = history.paid_in_period(period);
        let status = if paid >= expected {
            PeriodStatus::Paid
        } else if paid.is_positive() {
            PeriodStatus::Partial
        } else {
            PeriodStatus::Pending
        };

        summaries.push(BillingPeriodSummary {
            period,
            expected,
            paid,
            difference: expected - paid,
            status,
            last_payment_on: history.in_period(period).last().and_then(|p| p.paid_on),
        });
        period = period.next();
    }

    summaries
}

/// periods still open, oldest first
pub fn open_periods(summaries: &[BillingPeriodSummary]) -> impl Iterator<Item = &BillingPeriodSummary> {
    summaries.iter().filter(|s| s.status != PeriodStatus::Paid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::state::InstallmentPlan;
    use crate::types::PaymentKind;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn attributed(loan: &Loan, amount: i64, paid_on: NaiveDate, period: BillingPeriod) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            installment_id: None,
            amount: Money::from_major(amount),
            paid_on: Some(paid_on),
            kind: PaymentKind::InterestOnly,
            period: Some(period),
            notes: None,
        }
    }

    #[test]
    fn test_lump_sum_periods_expect_interest() {
        let loan = Loan::builder()
            .principal(Money::from_major(1_000))
            .monthly_rate(Rate::from_percentage(30))
            .loan_date(date(2023, 11, 20))
            .due_date(date(2023, 12, 20))
            .build()
            .unwrap();
        let payments = vec![
            attributed(&loan, 300, date(2023, 12, 18), BillingPeriod::new(2023, 12).unwrap()),
            attributed(&loan, 100, date(2024, 1, 19), BillingPeriod::new(2024, 1).unwrap()),
        ];

        let summaries = billing_periods(&loan, &payments, date(2024, 2, 5));
        let statuses: Vec<(String, PeriodStatus)> = summaries
            .iter()
            .map(|s| (s.period.label(), s.status))
            .collect();

        assert_eq!(
            statuses,
            vec![
                ("11/2023".to_string(), PeriodStatus::Pending),
                ("12/2023".to_string(), PeriodStatus::Paid),
                ("01/2024".to_string(), PeriodStatus::Partial),
                ("02/2024".to_string(), PeriodStatus::Pending),
            ]
        );
        assert_eq!(summaries[0].expected, Money::from_major(300));
        assert_eq!(summaries[2].difference, Money::from_major(200));
        assert_eq!(summaries[2].last_payment_on, Some(date(2024, 1, 19)));
        assert_eq!(open_periods(&summaries).count(), 3);
    }

    #[test]
    fn test_installment_periods_expect_installment_amount() {
        let loan = Loan::builder()
            .principal(Money::from_major(900))
            .loan_date(date(2024, 1, 10))
            .installments(InstallmentPlan::new(3, Money::from_major(350), 30, date(2024, 2, 10)))
            .build()
            .unwrap();

        let summaries = billing_periods(&loan, &[], date(2024, 1, 31));
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].expected, Money::from_major(350));
        assert_eq!(summaries[0].status, PeriodStatus::Pending);
    }

    #[test]
    fn test_today_before_loan_month_yields_nothing() {
        let loan = Loan::builder()
            .principal(Money::from_major(100))
            .loan_date(date(2024, 5, 1))
            .build()
            .unwrap();
        assert!(billing_periods(&loan, &[], date(2024, 4, 30)).is_empty());
    }
}
