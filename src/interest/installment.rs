use chrono::NaiveDate;

use crate::decimal::{Money, Rate};
use crate::interest::days_past;
use crate::interest::penalty::LatePenaltyEngine;
use crate::state::Installment;
use crate::types::{InstallmentId, InstallmentStatus};

/// what one open installment owes today
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentCharge {
    pub installment_id: InstallmentId,
    pub number: u32,
    pub due_date: Option<NaiveDate>,
    pub base: Money,
    pub accrued_interest: Money,
    pub accrued_penalty: Money,
    pub late_penalty: Money,
    pub days_late: u32,
}

impl InstallmentCharge {
    pub fn total(&self) -> Money {
        self.base + self.accrued_interest + self.accrued_penalty + self.late_penalty
    }
}

/// pending balance of an installment loan
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstallmentPending {
    pub pending_amount: Money,
    /// open installments in schedule order
    pub charges: Vec<InstallmentCharge>,
}

impl InstallmentPending {
    /// build the per-installment breakdown
    ///
    /// Paid and canceled installments owe nothing, whatever interest or penalty
    /// is stored on them.
    pub fn compute(installments: &[Installment], daily_late_rate: Rate, today: NaiveDate) -> Self {
        let penalty_engine = LatePenaltyEngine::new(daily_late_rate);

        let mut charges: Vec<InstallmentCharge> = installments
            .iter()
            .filter(|installment| installment.status.is_owing())
            .map(|installment| {
                let days_late = installment
                    .due_date
                    .map(|due| days_past(due, today))
                    .unwrap_or(0);
                let late = penalty_engine.calculate(installment.amount, days_late);

                InstallmentCharge {
                    installment_id: installment.id,
                    number: installment.number,
                    due_date: installment.due_date,
                    base: installment.amount.non_negative(),
                    accrued_interest: installment.accrued_interest.non_negative(),
                    accrued_penalty: installment.accrued_penalty.non_negative(),
                    late_penalty: late.penalty_amount,
                    days_late,
                }
            })
            .collect();
        charges.sort_by_key(|charge| charge.number);

        let pending_amount = charges.iter().map(InstallmentCharge::total).sum();

        Self {
            pending_amount,
            charges,
        }
    }

    /// the earliest open installment
    pub fn next_open(&self) -> Option<&InstallmentCharge> {
        self.charges.first()
    }

    pub fn open_count(&self) -> u32 {
        self.charges.len() as u32
    }

    pub fn overdue_count(&self) -> u32 {
        self.charges.iter().filter(|charge| charge.days_late > 0).count() as u32
    }
}

/// sum of what every non-paid installment owes today
pub fn compute_installment_pending(
    installments: &[Installment],
    daily_late_rate: Rate,
    today: NaiveDate,
) -> Money {
    InstallmentPending::compute(installments, daily_late_rate, today).pending_amount
}

/// whether every installment in the set is paid; an empty set is not settled
pub fn all_paid(installments: &[Installment]) -> bool {
    !installments.is_empty()
        && installments
            .iter()
            .all(|installment| installment.status == InstallmentStatus::Paid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment(number: u32, amount: i64, due: NaiveDate, status: InstallmentStatus) -> Installment {
        Installment {
            id: Uuid::new_v4(),
            loan_id: Uuid::nil(),
            number,
            amount: Money::from_major(amount),
            due_date: Some(due),
            paid_on: None,
            paid_amount: Money::ZERO,
            status,
            accrued_interest: Money::ZERO,
            accrued_penalty: Money::ZERO,
            notes: None,
        }
    }

    #[test]
    fn test_single_overdue_installment() {
        let today = date(2024, 3, 11);
        let rows = vec![installment(1, 500, date(2024, 3, 1), InstallmentStatus::Pending)];

        let pending = compute_installment_pending(&rows, Rate::from_percentage(5), today);
        assert_eq!(pending, Money::from_major(750));
    }

    #[test]
    fn test_paid_installments_contribute_nothing() {
        let today = date(2024, 3, 11);
        let mut paid = installment(1, 500, date(2024, 1, 1), InstallmentStatus::Paid);
        paid.accrued_interest = Money::from_major(40);
        paid.accrued_penalty = Money::from_major(15);
        let mut canceled = installment(2, 500, date(2024, 2, 1), InstallmentStatus::Canceled);
        canceled.accrued_penalty = Money::from_major(5);
        let open = installment(3, 500, date(2024, 4, 1), InstallmentStatus::Pending);

        let result = InstallmentPending::compute(&[paid, canceled, open], Rate::from_percentage(5), today);
        assert_eq!(result.pending_amount, Money::from_major(500));
        assert_eq!(result.open_count(), 1);
        assert_eq!(result.overdue_count(), 0);
    }

    #[test]
    fn test_stored_charges_are_added() {
        let today = date(2024, 3, 1);
        let mut row = installment(1, 300, date(2024, 2, 20), InstallmentStatus::Overdue);
        row.accrued_interest = Money::from_major(12);
        row.accrued_penalty = Money::from_major(6);

        let result = InstallmentPending::compute(&[row], Rate::from_percentage(1), today);
        let charge = result.next_open().unwrap();
        assert_eq!(charge.days_late, 10);
        assert_eq!(charge.late_penalty, Money::from_major(30));
        assert_eq!(result.pending_amount, Money::from_major(348));
    }

    #[test]
    fn test_zero_rate_and_empty_set() {
        let today = date(2024, 6, 1);
        let rows = vec![installment(1, 500, date(2024, 1, 1), InstallmentStatus::Pending)];
        assert_eq!(compute_installment_pending(&rows, Rate::ZERO, today), Money::from_major(500));
        assert_eq!(compute_installment_pending(&[], Rate::from_percentage(5), today), Money::ZERO);
        assert!(!all_paid(&[]));
    }

    #[test]
    fn test_charges_follow_schedule_order() {
        let today = date(2024, 1, 1);
        let rows = vec![
            installment(3, 100, date(2024, 3, 1), InstallmentStatus::Pending),
            installment(1, 100, date(2024, 1, 1), InstallmentStatus::Paid),
            installment(2, 100, date(2024, 2, 1), InstallmentStatus::Pending),
        ];
        let result = InstallmentPending::compute(&rows, Rate::ZERO, today);
        assert_eq!(result.next_open().map(|c| c.number), Some(2));
        assert!(!all_paid(&rows));
    }
}
