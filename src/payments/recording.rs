use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{LendError, Result};
use crate::events::{Event, EventStore};
use crate::interest::installment::all_paid;
use crate::payments::PaymentRequest;
use crate::state::{BillingPeriod, Installment, Loan, Payment};
use crate::types::{InstallmentStatus, LoanStatus, PaymentKind};

/// result of recording one payment
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub payment: Payment,
    pub old_status: LoanStatus,
    pub new_status: LoanStatus,
    /// number of the installment paid off by this payment
    pub installment_paid: Option<u32>,
    pub settled: bool,
}

impl PaymentOutcome {
    pub fn status_changed(&self) -> bool {
        self.old_status != self.new_status
    }
}

/// records payments against a loan and applies the resulting status transitions
///
/// Only a `total` payment, or paying off the last open installment, settles a
/// loan. Partial and interest-only payments are recorded without reducing what
/// the loan owes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentRecorder;

impl PaymentRecorder {
    pub fn new() -> Self {
        Self
    }

    pub fn record(
        &self,
        loan: &mut Loan,
        installments: &mut [Installment],
        request: PaymentRequest,
        events: &mut EventStore,
    ) -> Result<PaymentOutcome> {
        request.validate()?;

        if !loan.status.accepts_payments() {
            return Err(LendError::LoanNotPayable {
                status: loan.status,
            });
        }

        let old_status = loan.status;
        let paid_on = request.paid_on;
        let mut installment_paid = None;

        let new_status = match request.kind {
            PaymentKind::Installment => {
                let number = self.pay_installment(loan, installments, &request, events)?;
                installment_paid = Some(number);

                let loan_installments: Vec<Installment> = installments
                    .iter()
                    .filter(|i| i.loan_id == loan.id)
                    .cloned()
                    .collect();
                if all_paid(&loan_installments) {
                    LoanStatus::Paid
                } else {
                    old_status
                }
            }
            PaymentKind::Total => LoanStatus::Paid,
            PaymentKind::Partial if old_status == LoanStatus::Active => LoanStatus::Partial,
            PaymentKind::Partial | PaymentKind::InterestOnly | PaymentKind::PrincipalOnly => old_status,
        };

        let payment = Payment {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            installment_id: request.installment_id,
            amount: request.amount,
            paid_on: Some(paid_on),
            kind: request.kind,
            period: Some(request.period.unwrap_or_else(|| BillingPeriod::of(paid_on))),
            notes: request.notes.clone(),
        };

        events.emit(Event::PaymentRecorded {
            loan_id: loan.id,
            payment_id: payment.id,
            amount: payment.amount,
            kind: payment.kind,
            paid_on,
        });

        if new_status != old_status {
            self.change_status(loan, new_status, paid_on, payment.kind, events);
        }

        let settled = new_status == LoanStatus::Paid;
        if settled {
            tracing::info!(loan_id = %loan.id, %paid_on, "loan settled");
            events.emit(Event::LoanSettled {
                loan_id: loan.id,
                settled_on: paid_on,
            });
        }

        Ok(PaymentOutcome {
            payment,
            old_status,
            new_status,
            installment_paid,
            settled,
        })
    }

    fn pay_installment(
        &self,
        loan: &Loan,
        installments: &mut [Installment],
        request: &PaymentRequest,
        events: &mut EventStore,
    ) -> Result<u32> {
        if !loan.is_installment_based() {
            return Err(LendError::NotInstallmentLoan { loan_id: loan.id });
        }
        let installment_id = request.installment_id.ok_or(LendError::InstallmentRequired)?;

        let installment = installments
            .iter_mut()
            .find(|i| i.id == installment_id && i.loan_id == loan.id)
            .ok_or(LendError::InstallmentNotFound { id: installment_id })?;

        if !installment.status.is_owing() {
            return Err(LendError::InstallmentNotPayable {
                number: installment.number,
                status: installment.status,
            });
        }

        installment.status = InstallmentStatus::Paid;
        installment.paid_on = Some(request.paid_on);
        installment.paid_amount = request.amount;

        events.emit(Event::InstallmentPaid {
            loan_id: loan.id,
            installment_id,
            number: installment.number,
            amount: request.amount,
            paid_on: request.paid_on,
        });
        tracing::debug!(loan_id = %loan.id, number = installment.number, "installment paid");

        Ok(installment.number)
    }

    fn change_status(
        &self,
        loan: &mut Loan,
        new_status: LoanStatus,
        date: NaiveDate,
        kind: PaymentKind,
        events: &mut EventStore,
    ) {
        let old_status = loan.status;
        loan.status = new_status;
        events.emit(Event::StatusChanged {
            loan_id: loan.id,
            old_status,
            new_status,
            reason: format!("{:?} payment", kind),
            date,
        });
    }
}
