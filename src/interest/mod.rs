pub mod installment;
pub mod lump_sum;
pub mod penalty;

use chrono::NaiveDate;

pub use installment::{compute_installment_pending, InstallmentCharge, InstallmentPending};
pub use lump_sum::{compute_lump_sum_pending, LumpSumCalculator, LumpSumPending};
pub use penalty::{LatePenalty, LatePenaltyEngine};

/// signed calendar days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// whole calendar days `date` lies past `due`, never negative
pub fn days_past(due: NaiveDate, date: NaiveDate) -> u32 {
    u32::try_from(days_between(due, date).max(0)).unwrap_or(u32::MAX)
}

/// days overdue for a due date: measured to `today` while something is pending,
/// otherwise to the date the loan was settled, and zero without one
pub fn overdue_days(
    due_date: Option<NaiveDate>,
    still_pending: bool,
    settled_on: Option<NaiveDate>,
    today: NaiveDate,
) -> u32 {
    let Some(due) = due_date else {
        return 0;
    };
    let end = match (still_pending, settled_on) {
        (true, _) => today,
        (false, Some(settled_on)) => settled_on,
        (false, None) => return 0,
    };
    days_past(due, end)
}
