use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::config::{AccrualConfig, LateInterestPolicy};
use crate::decimal::Money;
use crate::interest::installment::all_paid;
use crate::interest::{overdue_days, InstallmentPending, LumpSumCalculator, LumpSumPending};
use crate::payments::PaymentHistory;
use crate::state::{Installment, Loan, Payment};
use crate::types::{LoanId, LoanStatus, PaymentKind, PaymentStanding};

/// most recent payment of a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPayment {
    pub amount: Money,
    pub paid_on: Option<NaiveDate>,
    pub kind: PaymentKind,
}

impl From<&Payment> for LastPayment {
    fn from(payment: &Payment) -> Self {
        Self {
            amount: payment.amount,
            paid_on: payment.paid_on,
            kind: payment.kind,
        }
    }
}

/// everything a view needs to know about one loan on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanEvaluation {
    pub loan_id: LoanId,
    /// total owed today, late interest included
    pub pending_amount: Money,
    /// owed today before daily late interest
    pub base_pending: Money,
    pub late_interest: Money,
    /// amount of the next period or installment
    pub next_period_amount: Money,
    pub pending_periods: u32,
    pub days_overdue: u32,
    /// due date the overdue days are counted from
    pub reference_due_date: Option<NaiveDate>,
    pub standing: PaymentStanding,
    pub last_payment: Option<LastPayment>,
    pub total_paid: Money,
    pub settled: bool,
}

/// accrual engine shared by every view
///
/// Never fails: missing dates mean "not yet due", malformed amounts were
/// already degraded to zero when the rows were read.
#[derive(Debug, Clone, Default)]
pub struct AccrualEngine {
    pub config: AccrualConfig,
}

impl AccrualEngine {
    pub fn new(config: AccrualConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AccrualConfig {
        &self.config
    }

    /// evaluate a loan as of `today`
    ///
    /// `payments` and `installments` may hold rows of other loans; only rows of
    /// this loan are considered.
    pub fn evaluate(
        &self,
        loan: &Loan,
        payments: &[Payment],
        installments: &[Installment],
        today: NaiveDate,
    ) -> LoanEvaluation {
        let history = PaymentHistory::for_loan(loan.id, payments);

        if loan.is_installment_based() {
            let own: Vec<Installment> = installments
                .iter()
                .filter(|i| i.loan_id == loan.id)
                .cloned()
                .collect();
            self.evaluate_installments(loan, &history, &own, today)
        } else {
            self.evaluate_lump_sum(loan, &history, today)
        }
    }

    /// evaluate as of the provider's current date
    pub fn evaluate_now(
        &self,
        loan: &Loan,
        payments: &[Payment],
        installments: &[Installment],
        time_provider: &SafeTimeProvider,
    ) -> LoanEvaluation {
        self.evaluate(loan, payments, installments, time_provider.now().date_naive())
    }

    /// lump-sum pending balance with the configured period length
    pub fn lump_sum_pending(&self, loan: &Loan, payments: &[Payment], today: NaiveDate) -> LumpSumPending {
        let total_paid = PaymentHistory::for_loan(loan.id, payments).total_paid();
        self.calculator().compute(
            loan.principal,
            loan.monthly_rate,
            loan.loan_date,
            loan.due_date,
            total_paid,
            today,
        )
    }

    pub fn days_overdue(
        &self,
        loan: &Loan,
        payments: &[Payment],
        installments: &[Installment],
        today: NaiveDate,
    ) -> u32 {
        self.evaluate(loan, payments, installments, today).days_overdue
    }

    fn calculator(&self) -> LumpSumCalculator {
        LumpSumCalculator::new(self.config.period_days)
    }

    fn evaluate_lump_sum(&self, loan: &Loan, history: &PaymentHistory<'_>, today: NaiveDate) -> LoanEvaluation {
        let total_paid = history.total_paid();
        let last_payment = history.last_payment();
        let last_payment_on = history.last_payment_date();

        let lump = self.calculator().compute(
            loan.principal,
            loan.monthly_rate,
            loan.loan_date,
            loan.due_date,
            total_paid,
            today,
        );

        let closed = !loan.status.is_open();
        let settled = closed || lump.settled;
        let (base_pending, pending_periods) = if closed {
            (Money::ZERO, 0)
        } else {
            (lump.pending_amount, lump.pending_periods)
        };

        let days_overdue = overdue_days(loan.due_date, base_pending.is_positive(), last_payment_on, today);

        let late_interest = match self.config.late_interest_policy {
            LateInterestPolicy::Stacked if !settled && days_overdue > 0 => {
                loan.principal.daily_charge(loan.daily_late_rate, days_overdue)
            }
            _ => Money::ZERO,
        };
        let pending_amount = base_pending + late_interest;

        LoanEvaluation {
            loan_id: loan.id,
            pending_amount,
            base_pending,
            late_interest,
            next_period_amount: lump.monthly_amount,
            pending_periods,
            days_overdue,
            reference_due_date: loan.due_date,
            standing: standing_for(loan, settled, last_payment, pending_amount, days_overdue),
            last_payment: last_payment.map(LastPayment::from),
            total_paid,
            settled,
        }
    }

    fn evaluate_installments(
        &self,
        loan: &Loan,
        history: &PaymentHistory<'_>,
        installments: &[Installment],
        today: NaiveDate,
    ) -> LoanEvaluation {
        let total_paid = history.total_paid();
        let last_payment = history.last_payment();
        let next_period_amount = loan
            .installment_plan
            .as_ref()
            .map(|plan| plan.amount)
            .unwrap_or(Money::ZERO);

        if installments.is_empty() {
            tracing::warn!(loan_id = %loan.id, "installment loan without installments, nothing pending");
        }

        let breakdown = if loan.status.is_open() {
            InstallmentPending::compute(installments, loan.daily_late_rate, today)
        } else {
            InstallmentPending::default()
        };

        let late_interest: Money = breakdown.charges.iter().map(|c| c.late_penalty).sum();
        let pending_amount = breakdown.pending_amount;
        let still_pending = pending_amount.is_positive();
        let settled = !loan.status.is_open()
            || all_paid(installments)
            || (!installments.is_empty() && breakdown.charges.is_empty());

        let reference_due_date = if still_pending {
            breakdown
                .next_open()
                .and_then(|charge| charge.due_date)
                .or(loan.due_date)
        } else {
            loan.due_date
                .or_else(|| installments.iter().filter_map(|i| i.due_date).max())
        };
        let settled_on = history
            .last_payment_date()
            .or_else(|| installments.iter().filter_map(|i| i.paid_on).max());
        let days_overdue = overdue_days(reference_due_date, still_pending, settled_on, today);

        LoanEvaluation {
            loan_id: loan.id,
            pending_amount,
            base_pending: pending_amount - late_interest,
            late_interest,
            next_period_amount,
            pending_periods: breakdown.open_count(),
            days_overdue,
            reference_due_date,
            standing: standing_for(loan, settled, last_payment, pending_amount, days_overdue),
            last_payment: last_payment.map(LastPayment::from),
            total_paid,
            settled,
        }
    }
}

/// settled loans read as paid and canceled ones are never overdue
fn standing_for(
    loan: &Loan,
    settled: bool,
    last_payment: Option<&Payment>,
    pending: Money,
    days_overdue: u32,
) -> PaymentStanding {
    match loan.status {
        LoanStatus::Canceled => PaymentStanding::OnTime,
        _ if settled => PaymentStanding::Paid,
        _ => classify_status(loan, last_payment, pending, days_overdue),
    }
}

/// payment standing, driven first by the kind of the most recent payment
pub fn classify_status(
    loan: &Loan,
    last_payment: Option<&Payment>,
    pending: Money,
    days_overdue: u32,
) -> PaymentStanding {
    if let Some(payment) = last_payment {
        match payment.kind {
            PaymentKind::InterestOnly => return PaymentStanding::PaidInterest,
            PaymentKind::Partial | PaymentKind::Installment => return PaymentStanding::Partial,
            PaymentKind::Total if pending.is_positive() => return PaymentStanding::PaidPriorPeriod,
            PaymentKind::Total => return PaymentStanding::Paid,
            PaymentKind::PrincipalOnly => {}
        }
    }

    if days_overdue > 0 {
        PaymentStanding::Overdue { days: days_overdue }
    } else if loan.status == LoanStatus::Partial {
        PaymentStanding::Partial
    } else {
        PaymentStanding::OnTime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::events::EventStore;
    use crate::payments::schedule::generate_installments;
    use crate::payments::{PaymentRecorder, PaymentRequest};
    use crate::state::{InstallmentPlan, LoanRow};
    use crate::types::InstallmentStatus;
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn lump_sum_loan() -> Loan {
        Loan::builder()
            .principal(Money::from_major(1_000))
            .monthly_rate(Rate::from_percentage(30))
            .daily_late_rate(Rate::from_percentage(1))
            .loan_date(date(2024, 1, 1))
            .due_date(date(2024, 2, 1))
            .build()
            .unwrap()
    }

    fn payment(loan: &Loan, amount: i64, paid_on: NaiveDate, kind: PaymentKind) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            installment_id: None,
            amount: Money::from_major(amount),
            paid_on: Some(paid_on),
            kind,
            period: None,
            notes: None,
        }
    }

    #[test]
    fn test_due_today_without_payments() {
        let loan = lump_sum_loan();
        let eval = AccrualEngine::default().evaluate(&loan, &[], &[], date(2024, 2, 1));

        assert_eq!(eval.pending_amount, Money::from_decimal(dec!(1300)));
        assert_eq!(eval.next_period_amount, Money::from_decimal(dec!(1300)));
        assert_eq!(eval.pending_periods, 1);
        assert_eq!(eval.days_overdue, 0);
        assert_eq!(eval.standing, PaymentStanding::OnTime);
        assert!(!eval.settled);
    }

    #[test]
    fn test_second_period_after_partial_payment() {
        let loan = lump_sum_loan();
        let payments = vec![payment(&loan, 300, date(2024, 2, 1), PaymentKind::Partial)];

        let eval = AccrualEngine::default().evaluate(&loan, &payments, &[], date(2024, 3, 5));
        assert_eq!(eval.pending_amount, Money::from_decimal(dec!(2300)));
        assert_eq!(eval.pending_periods, 2);
        assert_eq!(eval.late_interest, Money::ZERO);
        assert_eq!(eval.total_paid, Money::from_major(300));
        assert_eq!(eval.standing, PaymentStanding::Partial);
        assert!(eval.days_overdue > 30);
    }

    #[test]
    fn test_stacked_policy_adds_daily_interest() {
        let loan = lump_sum_loan();
        let payments = vec![payment(&loan, 300, date(2024, 2, 1), PaymentKind::Partial)];
        let engine = AccrualEngine::new(
            AccrualConfig::default().with_late_interest_policy(LateInterestPolicy::Stacked),
        );

        let eval = engine.evaluate(&loan, &payments, &[], date(2024, 3, 5));
        let expected_late = Money::from_major(10) * rust_decimal::Decimal::from(eval.days_overdue);
        assert_eq!(eval.late_interest, expected_late);
        assert_eq!(eval.base_pending, Money::from_major(2_300));
        assert_eq!(eval.pending_amount, Money::from_major(2_300) + expected_late);
    }

    #[test]
    fn test_fully_paid_loan_counts_days_to_last_payment() {
        let loan = lump_sum_loan();
        let payments = vec![payment(&loan, 1_300, date(2024, 2, 11), PaymentKind::Total)];
        let engine = AccrualEngine::new(
            AccrualConfig::default().with_late_interest_policy(LateInterestPolicy::Stacked),
        );

        let eval = engine.evaluate(&loan, &payments, &[], date(2024, 2, 20));
        assert!(eval.settled);
        assert_eq!(eval.pending_amount, Money::ZERO);
        assert_eq!(eval.pending_periods, 0);
        assert_eq!(eval.days_overdue, 10);
        assert_eq!(eval.late_interest, Money::ZERO);
        assert_eq!(eval.standing, PaymentStanding::Paid);
    }

    #[test]
    fn test_total_payment_with_new_period_open() {
        let loan = lump_sum_loan();
        let payments = vec![payment(&loan, 1_300, date(2024, 2, 1), PaymentKind::Total)];

        let eval = AccrualEngine::default().evaluate(&loan, &payments, &[], date(2024, 3, 5));
        assert_eq!(eval.pending_amount, Money::from_major(1_300));
        assert_eq!(eval.standing, PaymentStanding::PaidPriorPeriod);
    }

    #[test]
    fn test_paid_status_short_circuits() {
        let mut loan = lump_sum_loan();
        loan.status = LoanStatus::Paid;

        let eval = AccrualEngine::default().evaluate(&loan, &[], &[], date(2024, 6, 1));
        assert!(eval.settled);
        assert_eq!(eval.pending_amount, Money::ZERO);
        assert_eq!(eval.pending_periods, 0);
        assert_eq!(eval.days_overdue, 0);
        assert_eq!(eval.standing, PaymentStanding::Paid);
    }

    #[test]
    fn test_canceled_loan_is_never_overdue() {
        let mut loan = lump_sum_loan();
        loan.status = LoanStatus::Canceled;

        let eval = AccrualEngine::default().evaluate(&loan, &[], &[], date(2024, 6, 1));
        assert!(eval.settled);
        assert_eq!(eval.pending_amount, Money::ZERO);
        assert_eq!(eval.days_overdue, 0);
        assert_eq!(eval.standing, PaymentStanding::OnTime);
    }

    #[test]
    fn test_installment_overdue_with_daily_penalty() {
        let today = date(2024, 3, 11);
        let plan = InstallmentPlan::new(1, Money::from_major(500), 30, today - Duration::days(10));
        let loan = Loan::builder()
            .principal(Money::from_major(500))
            .daily_late_rate(Rate::from_percentage(5))
            .loan_date(date(2024, 2, 1))
            .installments(plan.clone())
            .build()
            .unwrap();
        let installments = generate_installments(loan.id, &plan).unwrap();

        let eval = AccrualEngine::default().evaluate(&loan, &[], &installments, today);
        assert_eq!(eval.pending_amount, Money::from_decimal(dec!(750)));
        assert_eq!(eval.late_interest, Money::from_decimal(dec!(250)));
        assert_eq!(eval.base_pending, Money::from_decimal(dec!(500)));
        assert_eq!(eval.days_overdue, 10);
        assert_eq!(eval.pending_periods, 1);
        assert_eq!(eval.standing, PaymentStanding::Overdue { days: 10 });
    }

    #[test]
    fn test_installment_loan_ignores_paid_rows_and_other_loans() {
        let plan = InstallmentPlan::new(3, Money::from_major(400), 30, date(2024, 2, 1));
        let loan = Loan::builder()
            .principal(Money::from_major(1_000))
            .loan_date(date(2024, 1, 1))
            .installments(plan.clone())
            .build()
            .unwrap();
        let mut installments = generate_installments(loan.id, &plan).unwrap();
        installments[0].status = InstallmentStatus::Paid;
        installments.extend(generate_installments(Uuid::new_v4(), &plan).unwrap());
        let payments = vec![payment(&loan, 400, date(2024, 2, 1), PaymentKind::Installment)];

        let eval = AccrualEngine::default().evaluate(&loan, &payments, &installments, date(2024, 2, 20));
        assert_eq!(eval.pending_amount, Money::from_major(800));
        assert_eq!(eval.pending_periods, 2);
        assert_eq!(eval.reference_due_date, Some(date(2024, 3, 2)));
        assert_eq!(eval.days_overdue, 0);
        assert_eq!(eval.next_period_amount, Money::from_major(400));
        assert_eq!(eval.standing, PaymentStanding::Partial);
        assert!(!eval.settled);
    }

    #[test]
    fn test_all_installments_paid_is_settled() {
        let plan = InstallmentPlan::new(2, Money::from_major(500), 30, date(2024, 2, 1));
        let loan = Loan::builder()
            .principal(Money::from_major(1_000))
            .loan_date(date(2024, 1, 1))
            .installments(plan.clone())
            .build()
            .unwrap();
        let mut installments = generate_installments(loan.id, &plan).unwrap();
        for installment in installments.iter_mut() {
            installment.status = InstallmentStatus::Paid;
        }

        let eval = AccrualEngine::default().evaluate(&loan, &[], &installments, date(2024, 6, 1));
        assert!(eval.settled);
        assert_eq!(eval.pending_amount, Money::ZERO);
        assert_eq!(eval.pending_periods, 0);
        assert_eq!(eval.standing, PaymentStanding::Paid);
    }

    #[test]
    fn test_recorded_installment_payoff_reads_as_paid() {
        let plan = InstallmentPlan::new(2, Money::from_major(500), 30, date(2024, 2, 1));
        let mut loan = Loan::builder()
            .principal(Money::from_major(1_000))
            .loan_date(date(2024, 1, 1))
            .due_date(date(2024, 3, 2))
            .installments(plan.clone())
            .build()
            .unwrap();
        let mut installments = generate_installments(loan.id, &plan).unwrap();
        let mut events = EventStore::new();
        let recorder = PaymentRecorder::new();

        let mut payments = Vec::new();
        for (index, paid_on) in [date(2024, 2, 1), date(2024, 3, 5)].into_iter().enumerate() {
            let request = PaymentRequest::new(Money::from_major(500), PaymentKind::Installment, paid_on)
                .for_installment(installments[index].id);
            let outcome = recorder.record(&mut loan, &mut installments, request, &mut events).unwrap();
            payments.push(outcome.payment);
        }
        assert_eq!(loan.status, LoanStatus::Paid);

        let eval = AccrualEngine::default().evaluate(&loan, &payments, &installments, date(2024, 6, 1));
        assert!(eval.settled);
        assert_eq!(eval.pending_amount, Money::ZERO);
        // counted to the last payment, not to today
        assert_eq!(eval.days_overdue, 3);
        assert_eq!(eval.standing, PaymentStanding::Paid);
    }

    #[test]
    fn test_flagged_loan_without_installment_rows() {
        let json = r#"{
            "id": "6f1c0a9e-0d6b-4a57-9d7e-2b1d2a3c4e5f",
            "cliente_id": "0e7b7d86-5d1a-4b0b-8f0e-6f3c2a1b0c9d",
            "valor_principal": 900.0,
            "data_emprestimo": "2024-01-01",
            "data_vencimento": "2024-02-01",
            "status": "ativo",
            "parcelado": true
        }"#;
        let loan = Loan::from(serde_json::from_str::<LoanRow>(json).unwrap());
        assert!(loan.is_installment_based());

        let eval = AccrualEngine::default().evaluate(&loan, &[], &[], date(2024, 6, 1));
        assert_eq!(eval.pending_amount, Money::ZERO);
        assert_eq!(eval.pending_periods, 0);
        assert_eq!(eval.days_overdue, 0);
        assert_eq!(eval.standing, PaymentStanding::OnTime);
        assert!(!eval.settled);
    }

    #[test]
    fn test_evaluate_now_uses_provider_date() {
        let loan = lump_sum_loan();
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
        ));

        let eval = AccrualEngine::default().evaluate_now(&loan, &[], &[], &time);
        assert_eq!(eval.pending_amount, Money::from_major(1_300));
    }

    #[test]
    fn test_classification_order() {
        let loan = lump_sum_loan();
        let today = date(2024, 3, 1);
        let interest = payment(&loan, 300, today, PaymentKind::InterestOnly);
        let principal = payment(&loan, 300, today, PaymentKind::PrincipalOnly);

        assert_eq!(
            classify_status(&loan, Some(&interest), Money::from_major(1_300), 20),
            PaymentStanding::PaidInterest
        );
        assert_eq!(
            classify_status(&loan, Some(&principal), Money::from_major(1_300), 20),
            PaymentStanding::Overdue { days: 20 }
        );
        assert_eq!(classify_status(&loan, None, Money::from_major(1_300), 0), PaymentStanding::OnTime);

        let mut partial_loan = loan.clone();
        partial_loan.status = LoanStatus::Partial;
        assert_eq!(
            classify_status(&partial_loan, None, Money::from_major(1_300), 0),
            PaymentStanding::Partial
        );
    }

    #[test]
    fn test_days_overdue_never_negative_before_due() {
        let loan = lump_sum_loan();
        assert_eq!(AccrualEngine::default().days_overdue(&loan, &[], &[], date(2024, 1, 15)), 0);
    }
}
