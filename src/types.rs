use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a client
pub type ClientId = Uuid;

/// unique identifier for an installment row
pub type InstallmentId = Uuid;

/// unique identifier for a payment row
pub type PaymentId = Uuid;

/// loan lifecycle status
///
/// Rows written by the legacy frontend use portuguese values, accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// created and not yet due, or due with nothing paid
    #[default]
    #[serde(alias = "ativo")]
    Active,
    /// some amount received, still open
    #[serde(alias = "parcial")]
    Partial,
    /// past due date and still open
    #[serde(alias = "vencido")]
    Overdue,
    /// settled
    #[serde(alias = "pago")]
    Paid,
    /// canceled, owes nothing
    #[serde(alias = "cancelado")]
    Canceled,
}

impl LoanStatus {
    /// open loans are the ones that still count towards receivables
    pub fn is_open(&self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Partial | LoanStatus::Overdue)
    }

    pub fn accepts_payments(&self) -> bool {
        self.is_open()
    }
}

/// installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    #[default]
    #[serde(alias = "pendente")]
    Pending,
    #[serde(alias = "pago")]
    Paid,
    #[serde(alias = "atrasado")]
    Overdue,
    #[serde(alias = "cancelado")]
    Canceled,
}

impl InstallmentStatus {
    /// whether the installment still owes money
    pub fn is_owing(&self) -> bool {
        matches!(self, InstallmentStatus::Pending | InstallmentStatus::Overdue)
    }
}

/// what a recorded payment is meant to cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// settles the open period in full
    Total,
    /// part of the open period, never changes loan status
    #[serde(alias = "parcial")]
    Partial,
    /// interest only, principal stays outstanding
    #[serde(alias = "juros")]
    InterestOnly,
    /// principal only
    #[serde(alias = "principal")]
    PrincipalOnly,
    /// pays off one installment of an installment loan
    #[serde(alias = "parcela")]
    Installment,
}

/// payment standing of a loan as shown to operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "standing")]
pub enum PaymentStanding {
    OnTime,
    Partial,
    Overdue { days: u32 },
    /// last payment covered interest only
    PaidInterest,
    /// last payment settled a prior period, a new period is open
    PaidPriorPeriod,
    Paid,
}

impl PaymentStanding {
    pub fn label(&self) -> String {
        match self {
            PaymentStanding::OnTime => "on time".to_string(),
            PaymentStanding::Partial => "partial payment".to_string(),
            PaymentStanding::Overdue { days } => format!("overdue ({} days)", days),
            PaymentStanding::PaidInterest => "interest paid".to_string(),
            PaymentStanding::PaidPriorPeriod => "paid (prior period)".to_string(),
            PaymentStanding::Paid => "paid".to_string(),
        }
    }
}

/// status of one month/year billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Pending,
    Partial,
    Paid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_status_values() {
        let status: LoanStatus = serde_json::from_str("\"vencido\"").unwrap();
        assert_eq!(status, LoanStatus::Overdue);

        let status: LoanStatus = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(status, LoanStatus::Partial);

        let kind: PaymentKind = serde_json::from_str("\"juros\"").unwrap();
        assert_eq!(kind, PaymentKind::InterestOnly);

        let installment: InstallmentStatus = serde_json::from_str("\"atrasado\"").unwrap();
        assert_eq!(installment, InstallmentStatus::Overdue);
    }

    #[test]
    fn test_open_statuses() {
        assert!(LoanStatus::Active.is_open());
        assert!(LoanStatus::Overdue.is_open());
        assert!(!LoanStatus::Paid.is_open());
        assert!(!LoanStatus::Canceled.accepts_payments());
    }

    #[test]
    fn test_standing_labels() {
        assert_eq!(PaymentStanding::Overdue { days: 12 }.label(), "overdue (12 days)");
        let json = serde_json::to_string(&PaymentStanding::Overdue { days: 3 }).unwrap();
        assert_eq!(json, r#"{"standing":"overdue","days":3}"#);
    }
}
