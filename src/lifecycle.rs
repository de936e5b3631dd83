use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::events::{Event, EventStore};
use crate::interest::days_past;
use crate::state::{Installment, Loan};
use crate::types::{InstallmentId, InstallmentStatus, LoanId, LoanStatus};

/// an installment status change applied by a refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentTransition {
    pub installment_id: InstallmentId,
    pub number: u32,
    pub from: InstallmentStatus,
    pub to: InstallmentStatus,
    pub days_late: u32,
}

/// a loan status change applied by a refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTransition {
    pub loan_id: LoanId,
    pub from: LoanStatus,
    pub to: LoanStatus,
    pub days_overdue: u32,
}

/// everything one daily refresh changed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusRefresh {
    pub loan: Option<LoanTransition>,
    pub installments: Vec<InstallmentTransition>,
}

impl StatusRefresh {
    pub fn is_empty(&self) -> bool {
        self.loan.is_none() && self.installments.is_empty()
    }
}

/// mark pending installments past their due date as overdue
pub fn refresh_installment_statuses(
    installments: &mut [Installment],
    today: NaiveDate,
) -> Vec<InstallmentTransition> {
    let mut transitions = Vec::new();

    for installment in installments.iter_mut() {
        if installment.status != InstallmentStatus::Pending {
            continue;
        }
        let Some(due) = installment.due_date else {
            continue;
        };
        if today > due {
            installment.status = InstallmentStatus::Overdue;
            transitions.push(InstallmentTransition {
                installment_id: installment.id,
                number: installment.number,
                from: InstallmentStatus::Pending,
                to: InstallmentStatus::Overdue,
                days_late: days_past(due, today),
            });
        }
    }

    transitions
}

/// move an active or partially paid loan past its due date to overdue
pub fn refresh_loan_status(loan: &mut Loan, today: NaiveDate) -> Option<LoanTransition> {
    let due = loan.due_date;
    mark_overdue(loan, due, today)
}

/// daily refresh of a loan and its installments, recording events for every change
///
/// Installment loans go overdue as soon as their earliest open installment does;
/// lump-sum loans follow their own due date.
pub fn update_daily_status(
    loan: &mut Loan,
    installments: &mut [Installment],
    today: NaiveDate,
    events: &mut EventStore,
) -> StatusRefresh {
    let mut refresh = StatusRefresh::default();

    if loan.is_installment_based() {
        let loan_id = loan.id;
        for installment in installments.iter_mut().filter(|i| i.loan_id == loan_id) {
            let transitions = refresh_installment_statuses(std::slice::from_mut(installment), today);
            refresh.installments.extend(transitions);
        }

        for transition in &refresh.installments {
            events.emit(Event::InstallmentStatusChanged {
                loan_id: loan.id,
                installment_id: transition.installment_id,
                number: transition.number,
                old_status: transition.from,
                new_status: transition.to,
                date: today,
            });
        }

        let earliest_open_due = installments
            .iter()
            .filter(|i| i.loan_id == loan.id && i.status.is_owing())
            .filter_map(|i| i.due_date)
            .min();
        refresh.loan = mark_overdue(loan, earliest_open_due.or(loan.due_date), today);
    } else {
        refresh.loan = refresh_loan_status(loan, today);
    }

    if let Some(transition) = &refresh.loan {
        tracing::debug!(
            loan_id = %loan.id,
            days_overdue = transition.days_overdue,
            "loan moved to overdue"
        );
        events.emit(Event::StatusChanged {
            loan_id: loan.id,
            old_status: transition.from,
            new_status: transition.to,
            reason: format!("{} days past due", transition.days_overdue),
            date: today,
        });
    }

    refresh
}

fn mark_overdue(loan: &mut Loan, due: Option<NaiveDate>, today: NaiveDate) -> Option<LoanTransition> {
    if !matches!(loan.status, LoanStatus::Active | LoanStatus::Partial) {
        return None;
    }
    let due = due?;
    if today <= due {
        return None;
    }

    let from = loan.status;
    loan.status = LoanStatus::Overdue;
    Some(LoanTransition {
        loan_id: loan.id,
        from,
        to: LoanStatus::Overdue,
        days_overdue: days_past(due, today),
    })
}
