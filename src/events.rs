use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{InstallmentId, InstallmentStatus, LoanId, LoanStatus, PaymentId, PaymentKind};

/// domain events produced by explicit operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // schedule events
    InstallmentsGenerated {
        loan_id: LoanId,
        count: u32,
        first_due: NaiveDate,
        last_due: NaiveDate,
    },

    // payment events
    PaymentRecorded {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        kind: PaymentKind,
        paid_on: NaiveDate,
    },
    InstallmentPaid {
        loan_id: LoanId,
        installment_id: InstallmentId,
        number: u32,
        amount: Money,
        paid_on: NaiveDate,
    },
    LoanSettled {
        loan_id: LoanId,
        settled_on: NaiveDate,
    },

    // status change events
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        reason: String,
        date: NaiveDate,
    },
    InstallmentStatusChanged {
        loan_id: LoanId,
        installment_id: InstallmentId,
        number: u32,
        old_status: InstallmentStatus,
        new_status: InstallmentStatus,
        date: NaiveDate,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
