/// serializable voucher handed to the document-export collaborator
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::engine::LoanEvaluation;
use crate::state::{Client, Installment, Loan};
use crate::types::{InstallmentStatus, LoanId, LoanStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherView {
    pub loan_id: LoanId,
    pub issued_on: NaiveDate,
    pub client: ClientView,
    pub terms: TermsView,
    pub balance: BalanceView,
    pub installments: Vec<InstallmentLine>,
    pub payment_key: Option<PaymentKeyView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientView {
    pub name: String,
    pub tax_id: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsView {
    pub principal: Money,
    pub monthly_rate: Rate,
    pub daily_late_rate: Rate,
    pub loan_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: LoanStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    pub pending_amount: Money,
    pub next_period_amount: Money,
    pub pending_periods: u32,
    pub days_overdue: u32,
    pub standing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentLine {
    pub number: u32,
    pub amount: Money,
    pub due_date: Option<NaiveDate>,
    pub status: InstallmentStatus,
}

/// instant-payment key printed on the voucher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentKeyView {
    pub kind: String,
    pub key: String,
}

impl VoucherView {
    pub fn build(loan: &Loan, client: &Client, evaluation: &LoanEvaluation, issued_on: NaiveDate) -> Self {
        VoucherView {
            loan_id: loan.id,
            issued_on,
            client: ClientView {
                name: client.name.clone(),
                tax_id: client.tax_id.clone(),
                phone: client.phone.clone(),
            },
            terms: TermsView {
                principal: loan.principal,
                monthly_rate: loan.monthly_rate,
                daily_late_rate: loan.daily_late_rate,
                loan_date: loan.loan_date,
                due_date: loan.due_date,
                status: loan.status,
            },
            balance: BalanceView {
                pending_amount: evaluation.pending_amount,
                next_period_amount: evaluation.next_period_amount,
                pending_periods: evaluation.pending_periods,
                days_overdue: evaluation.days_overdue,
                standing: evaluation.standing.label(),
            },
            installments: Vec::new(),
            payment_key: None,
        }
    }

    /// list the installments of the loan, in schedule order
    pub fn with_installments(mut self, installments: &[Installment]) -> Self {
        let mut lines: Vec<InstallmentLine> = installments
            .iter()
            .filter(|i| i.loan_id == self.loan_id)
            .map(|i| InstallmentLine {
                number: i.number,
                amount: i.amount,
                due_date: i.due_date,
                status: i.status,
            })
            .collect();
        lines.sort_by_key(|line| line.number);
        self.installments = lines;
        self
    }

    pub fn with_payment_key(mut self, kind: impl Into<String>, key: impl Into<String>) -> Self {
        self.payment_key = Some(PaymentKeyView {
            kind: kind.into(),
            key: key.into(),
        });
        self
    }

    /// printable lines, amounts in reais and dates as dd/mm/yyyy
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            "Due date voucher".to_string(),
            format!("Client: {}", self.client.name),
            format!("Loan: {}", self.terms.principal.format_brl()),
            format!("Due date: {}", format_date(self.terms.due_date)),
            format!("Monthly interest: {}", self.terms.monthly_rate),
            format!("Daily late interest: {}", self.terms.daily_late_rate),
            format!("Pending: {}", self.balance.pending_amount.format_brl()),
        ];

        if !self.installments.is_empty() {
            lines.push("Installments".to_string());
            for line in &self.installments {
                lines.push(format!(
                    "#{} - {} - due {} - {:?}",
                    line.number,
                    line.amount.format_brl(),
                    format_date(line.due_date),
                    line.status
                ));
            }
        }

        if let Some(key) = &self.payment_key {
            lines.push(format!("Payment key ({}): {}", key.kind, key.key));
        }

        lines
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}
