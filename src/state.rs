use chrono::{Datelike, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LendError, Result};
use crate::types::{
    ClientId, InstallmentId, InstallmentStatus, LoanId, LoanStatus, PaymentId, PaymentKind,
};

/// borrower identity and contact details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    /// national tax id (CPF)
    pub tax_id: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// installment plan parameters, only present on installment loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub count: u32,
    pub amount: Money,
    pub interval_days: u32,
    pub first_due: NaiveDate,
}

impl InstallmentPlan {
    pub fn new(count: u32, amount: Money, interval_days: u32, first_due: NaiveDate) -> Self {
        Self {
            count,
            amount,
            interval_days,
            first_due,
        }
    }

    /// split a principal into equal installments, rounded to cents
    pub fn split_evenly(
        principal: Money,
        count: u32,
        interval_days: u32,
        first_due: NaiveDate,
    ) -> Result<Self> {
        if count == 0 {
            return Err(LendError::InvalidInstallmentPlan {
                message: "installment count must be at least 1".to_string(),
            });
        }
        let amount = (principal / rust_decimal::Decimal::from(count)).round_cents();
        Ok(Self::new(count, amount, interval_days, first_due))
    }

    /// total scheduled across all installments
    pub fn scheduled_total(&self) -> Money {
        self.amount * rust_decimal::Decimal::from(self.count)
    }
}

/// a loan as consumed by the accrual engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub client_id: ClientId,
    pub principal: Money,
    /// monthly interest rate
    pub monthly_rate: Rate,
    /// daily late-penalty rate
    pub daily_late_rate: Rate,
    pub loan_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: LoanStatus,
    /// `Some` for installment loans, `None` for lump-sum loans
    pub installment_plan: Option<InstallmentPlan>,
    pub notes: Option<String>,
}

impl Loan {
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    pub fn is_installment_based(&self) -> bool {
        self.installment_plan.is_some()
    }

    /// principal plus one month of interest
    pub fn monthly_amount(&self) -> Money {
        self.principal + self.principal.times_rate(self.monthly_rate)
    }

    pub fn is_due_on_or_before(&self, date: NaiveDate) -> bool {
        self.due_date.map(|due| due <= date).unwrap_or(false)
    }
}

/// flat loan row as stored by the persistence layer
///
/// Installment columns are only meaningful when `installment_based` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRow {
    pub id: LoanId,
    #[serde(alias = "cliente_id")]
    pub client_id: ClientId,
    #[serde(alias = "valor_principal")]
    pub principal: f64,
    #[serde(default, alias = "taxa_juros_mensal")]
    pub monthly_rate_percent: Option<f64>,
    #[serde(default, alias = "taxa_juros_diaria_atraso")]
    pub daily_late_rate_percent: Option<f64>,
    #[serde(alias = "data_emprestimo")]
    pub loan_date: NaiveDate,
    #[serde(default, alias = "data_vencimento")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<LoanStatus>,
    #[serde(default, alias = "parcelado")]
    pub installment_based: bool,
    #[serde(default, alias = "numero_parcelas")]
    pub installment_count: Option<u32>,
    #[serde(default, alias = "valor_parcela")]
    pub installment_amount: Option<f64>,
    #[serde(default, alias = "intervalo_pagamento")]
    pub installment_interval_days: Option<u32>,
    #[serde(default, alias = "data_primeira_parcela")]
    pub first_installment_date: Option<NaiveDate>,
    #[serde(default, alias = "observacoes")]
    pub notes: Option<String>,
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        let installment_plan = if row.installment_based {
            let first_due = row
                .first_installment_date
                .or(row.due_date)
                .unwrap_or(row.loan_date);
            if row.installment_count.unwrap_or(0) == 0 {
                tracing::warn!(loan_id = %row.id, "installment loan without installment count");
            }
            Some(InstallmentPlan {
                count: row.installment_count.unwrap_or(0),
                amount: row.installment_amount.map(Money::from_f64).unwrap_or(Money::ZERO),
                interval_days: row.installment_interval_days.unwrap_or(DEFAULT_INTERVAL_DAYS),
                first_due,
            })
        } else {
            None
        };

        Loan {
            id: row.id,
            client_id: row.client_id,
            principal: Money::from_f64(row.principal),
            monthly_rate: row.monthly_rate_percent.map(Rate::from_percent_f64).unwrap_or(Rate::ZERO),
            daily_late_rate: row
                .daily_late_rate_percent
                .map(Rate::from_percent_f64)
                .unwrap_or(Rate::ZERO),
            loan_date: row.loan_date,
            due_date: row.due_date,
            status: row.status.unwrap_or_default(),
            installment_plan,
            notes: row.notes,
        }
    }
}

/// default spacing between installments
pub const DEFAULT_INTERVAL_DAYS: u32 = 30;

/// one scheduled installment of an installment loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    #[serde(alias = "emprestimo_id")]
    pub loan_id: LoanId,
    /// 1-based sequence number
    #[serde(alias = "numero_parcela")]
    pub number: u32,
    #[serde(alias = "valor_parcela")]
    pub amount: Money,
    #[serde(default, alias = "data_vencimento")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, alias = "data_pagamento")]
    pub paid_on: Option<NaiveDate>,
    #[serde(default, alias = "valor_pago")]
    pub paid_amount: Money,
    #[serde(default)]
    pub status: InstallmentStatus,
    /// interest already booked on this installment by the backend
    #[serde(default, alias = "juros_aplicados")]
    pub accrued_interest: Money,
    /// penalty already booked on this installment by the backend
    #[serde(default, alias = "multa_aplicada")]
    pub accrued_penalty: Money,
    #[serde(default, alias = "observacoes")]
    pub notes: Option<String>,
}

impl Installment {
    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }
}

/// month/year a payment is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub year: i32,
    pub month: u32,
}

impl BillingPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(LendError::InvalidDate {
                message: format!("month out of range: {}", month),
            });
        }
        Ok(Self { year, month })
    }

    /// period containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// "MM/YYYY"
    pub fn label(&self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }
}

/// a recorded payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    #[serde(alias = "emprestimo_id")]
    pub loan_id: LoanId,
    #[serde(default, alias = "parcela_id")]
    pub installment_id: Option<InstallmentId>,
    #[serde(alias = "valor_pago")]
    pub amount: Money,
    #[serde(default, alias = "data_pagamento")]
    pub paid_on: Option<NaiveDate>,
    #[serde(alias = "tipo_pagamento")]
    pub kind: PaymentKind,
    /// optional month/year attribution
    #[serde(default)]
    pub period: Option<BillingPeriod>,
    #[serde(default, alias = "observacoes")]
    pub notes: Option<String>,
}

/// payment row as stored by the backend, month and year in flat columns
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRow {
    pub id: PaymentId,
    #[serde(alias = "emprestimo_id")]
    pub loan_id: LoanId,
    #[serde(default, alias = "parcela_id")]
    pub installment_id: Option<InstallmentId>,
    #[serde(alias = "valor_pago")]
    pub amount: f64,
    #[serde(default, alias = "data_pagamento")]
    pub paid_on: Option<NaiveDate>,
    #[serde(alias = "tipo_pagamento")]
    pub kind: PaymentKind,
    #[serde(default, alias = "mes_pagamento")]
    pub month: Option<u32>,
    #[serde(default, alias = "ano_pagamento")]
    pub year: Option<i32>,
    #[serde(default, alias = "observacoes")]
    pub notes: Option<String>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        let period = match (row.year, row.month) {
            (Some(year), Some(month)) => match BillingPeriod::new(year, month) {
                Ok(period) => Some(period),
                Err(err) => {
                    tracing::warn!(payment_id = %row.id, %err, "ignoring payment period");
                    None
                }
            },
            _ => None,
        };

        Payment {
            id: row.id,
            loan_id: row.loan_id,
            installment_id: row.installment_id,
            amount: Money::from_f64(row.amount),
            paid_on: row.paid_on,
            kind: row.kind,
            period,
            notes: row.notes,
        }
    }
}

/// builder for loans
pub struct LoanBuilder {
    client_id: Option<ClientId>,
    principal: Option<Money>,
    monthly_rate: Option<Rate>,
    daily_late_rate: Option<Rate>,
    loan_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    installment_plan: Option<InstallmentPlan>,
    notes: Option<String>,
}

impl Default for LoanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self {
            client_id: None,
            principal: None,
            monthly_rate: None,
            daily_late_rate: None,
            loan_date: None,
            due_date: None,
            installment_plan: None,
            notes: None,
        }
    }

    pub fn client_id(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn monthly_rate(mut self, rate: Rate) -> Self {
        self.monthly_rate = Some(rate);
        self
    }

    pub fn daily_late_rate(mut self, rate: Rate) -> Self {
        self.daily_late_rate = Some(rate);
        self
    }

    pub fn loan_date(mut self, date: NaiveDate) -> Self {
        self.loan_date = Some(date);
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn installments(mut self, plan: InstallmentPlan) -> Self {
        self.installment_plan = Some(plan);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// build using system time when no loan date was set
    pub fn build(self) -> Result<Loan> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.build_with_time(&time)
    }

    /// build with explicit time provider
    pub fn build_with_time(self, time_provider: &SafeTimeProvider) -> Result<Loan> {
        let principal = self.principal.ok_or(LendError::MissingField { field: "principal" })?;
        if !principal.is_positive() {
            return Err(LendError::InvalidConfiguration {
                message: format!("principal must be positive, got {}", principal),
            });
        }

        let loan_date = self
            .loan_date
            .unwrap_or_else(|| time_provider.now().date_naive());

        if let Some(due) = self.due_date {
            if due < loan_date {
                return Err(LendError::InvalidDate {
                    message: format!("due date {} precedes loan date {}", due, loan_date),
                });
            }
        }

        if let Some(plan) = &self.installment_plan {
            if plan.count == 0 || plan.interval_days == 0 || !plan.amount.is_positive() {
                return Err(LendError::InvalidInstallmentPlan {
                    message: format!(
                        "count {}, interval {} days, amount {}",
                        plan.count, plan.interval_days, plan.amount
                    ),
                });
            }
        }

        Ok(Loan {
            id: Uuid::new_v4(),
            client_id: self.client_id.unwrap_or_else(Uuid::new_v4),
            principal,
            monthly_rate: self.monthly_rate.unwrap_or(Rate::ZERO),
            daily_late_rate: self.daily_late_rate.unwrap_or(Rate::ZERO),
            loan_date,
            due_date: self.due_date,
            status: LoanStatus::Active,
            installment_plan: self.installment_plan,
            notes: self.notes,
        })
    }
}
