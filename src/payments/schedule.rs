use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LendError, Result};
use crate::events::{Event, EventStore};
use crate::state::{Installment, InstallmentPlan, Loan};
use crate::types::{InstallmentStatus, LoanId};

/// due dates of every installment in a plan
pub fn installment_due_dates(plan: &InstallmentPlan) -> Result<Vec<NaiveDate>> {
    validate_plan(plan)?;

    (0..plan.count)
        .map(|offset| {
            let days = i64::from(offset) * i64::from(plan.interval_days);
            plan.first_due
                .checked_add_signed(Duration::days(days))
                .ok_or_else(|| LendError::InvalidDate {
                    message: format!("installment {} falls outside the calendar", offset + 1),
                })
        })
        .collect()
}

/// generate the installments of a plan, numbered from 1
///
/// Installments are generated once, when the loan is created.
pub fn generate_installments(loan_id: LoanId, plan: &InstallmentPlan) -> Result<Vec<Installment>> {
    let due_dates = installment_due_dates(plan)?;

    Ok(due_dates
        .into_iter()
        .zip(1..)
        .map(|(due, number)| Installment {
            id: Uuid::new_v4(),
            loan_id,
            number,
            amount: plan.amount,
            due_date: Some(due),
            paid_on: None,
            paid_amount: Money::ZERO,
            status: InstallmentStatus::Pending,
            accrued_interest: Money::ZERO,
            accrued_penalty: Money::ZERO,
            notes: None,
        })
        .collect())
}

/// generate the installments of an installment loan and record the event
pub fn generate_for_loan(loan: &Loan, events: &mut EventStore) -> Result<Vec<Installment>> {
    let plan = loan
        .installment_plan
        .as_ref()
        .ok_or(LendError::NotInstallmentLoan { loan_id: loan.id })?;

    let installments = generate_installments(loan.id, plan)?;

    if let (Some(first), Some(last)) = (installments.first(), installments.last()) {
        events.emit(Event::InstallmentsGenerated {
            loan_id: loan.id,
            count: plan.count,
            first_due: first.due_date.unwrap_or(plan.first_due),
            last_due: last.due_date.unwrap_or(plan.first_due),
        });
    }
    tracing::debug!(loan_id = %loan.id, count = plan.count, "installments generated");

    Ok(installments)
}

fn validate_plan(plan: &InstallmentPlan) -> Result<()> {
    if plan.count == 0 {
        return Err(LendError::InvalidInstallmentPlan {
            message: "installment count must be at least 1".to_string(),
        });
    }
    if plan.interval_days == 0 {
        return Err(LendError::InvalidInstallmentPlan {
            message: "interval must be at least 1 day".to_string(),
        });
    }
    if !plan.amount.is_positive() {
        return Err(LendError::InvalidInstallmentPlan {
            message: format!("installment amount must be positive, got {}", plan.amount),
        });
    }
    Ok(())
}
