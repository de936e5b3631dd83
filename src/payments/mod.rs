pub mod periods;
pub mod recording;
pub mod schedule;

use chrono::NaiveDate;

use crate::decimal::Money;
use crate::errors::{LendError, Result};
use crate::state::{BillingPeriod, Payment};
use crate::types::{InstallmentId, LoanId, PaymentKind};

pub use periods::{billing_periods, expected_per_period, BillingPeriodSummary};
pub use recording::{PaymentOutcome, PaymentRecorder};
pub use schedule::generate_installments;

/// payment request as entered by an operator
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub amount: Money,
    pub paid_on: NaiveDate,
    pub kind: PaymentKind,
    pub installment_id: Option<InstallmentId>,
    pub period: Option<BillingPeriod>,
    pub notes: Option<String>,
}

impl PaymentRequest {
    pub fn new(amount: Money, kind: PaymentKind, paid_on: NaiveDate) -> Self {
        Self {
            amount,
            paid_on,
            kind,
            installment_id: None,
            period: None,
            notes: None,
        }
    }

    pub fn for_installment(mut self, installment_id: InstallmentId) -> Self {
        self.installment_id = Some(installment_id);
        self
    }

    /// attribute the payment to a month/year
    pub fn for_period(mut self, period: BillingPeriod) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(LendError::InvalidPaymentAmount {
                amount: self.amount,
            });
        }
        if self.kind == PaymentKind::Installment && self.installment_id.is_none() {
            return Err(LendError::InstallmentRequired);
        }
        Ok(())
    }
}

/// read-only view over the payments of one loan
#[derive(Debug, Clone)]
pub struct PaymentHistory<'a> {
    pub loan_id: LoanId,
    payments: Vec<&'a Payment>,
}

impl<'a> PaymentHistory<'a> {
    /// payments belonging to `loan_id`, ignoring rows of other loans
    pub fn for_loan(loan_id: LoanId, payments: &'a [Payment]) -> Self {
        Self {
            loan_id,
            payments: payments.iter().filter(|p| p.loan_id == loan_id).collect(),
        }
    }

    pub fn total_paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount.non_negative()).sum()
    }

    /// most recent payment; undated rows rank below dated ones, later rows win ties
    pub fn last_payment(&self) -> Option<&'a Payment> {
        self.payments.iter().copied().max_by_key(|p| p.paid_on)
    }

    pub fn last_payment_date(&self) -> Option<NaiveDate> {
        self.payments.iter().filter_map(|p| p.paid_on).max()
    }

    /// total attributed to a month/year bucket
    pub fn paid_in_period(&self, period: BillingPeriod) -> Money {
        self.in_period(period).map(|p| p.amount.non_negative()).sum()
    }

    /// payments attributed to a month/year bucket, in recorded order
    pub fn in_period(&self, period: BillingPeriod) -> impl Iterator<Item = &'a Payment> + '_ {
        self.payments
            .iter()
            .copied()
            .filter(move |p| p.period == Some(period))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Payment> + '_ {
        self.payments.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}
