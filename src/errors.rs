use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{InstallmentStatus, LoanStatus};

#[derive(Error, Debug, PartialEq)]
pub enum LendError {
    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("loan does not accept payments: current status is {status:?}")]
    LoanNotPayable {
        status: LoanStatus,
    },

    #[error("loan {loan_id} has no installment plan")]
    NotInstallmentLoan {
        loan_id: Uuid,
    },

    #[error("installment payment requires an installment id")]
    InstallmentRequired,

    #[error("installment not found: {id}")]
    InstallmentNotFound {
        id: Uuid,
    },

    #[error("installment {number} cannot be paid: current status is {status:?}")]
    InstallmentNotPayable {
        number: u32,
        status: InstallmentStatus,
    },

    #[error("invalid installment plan: {message}")]
    InvalidInstallmentPlan {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("missing field: {field}")]
    MissingField {
        field: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, LendError>;
