use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::engine::{AccrualEngine, LastPayment, LoanEvaluation};
use crate::state::{Client, Installment, Loan, Payment};
use crate::types::{ClientId, InstallmentStatus, LoanId, LoanStatus, PaymentStanding};

/// rows loaded from the persistence collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanBook {
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub installments: Vec<Installment>,
}

impl LoanBook {
    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn loan(&self, id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }

    /// loans still counting towards receivables
    pub fn open_loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(|l| l.status.is_open())
    }

    pub fn evaluate(&self, loan: &Loan, engine: &AccrualEngine, today: NaiveDate) -> LoanEvaluation {
        engine.evaluate(loan, &self.payments, &self.installments, today)
    }
}

/// dashboard totals over open loans
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub open_loans: u32,
    pub total_lent: Money,
    /// pending amounts including late interest
    pub total_receivable: Money,
    pub overdue_count: u32,
    pub due_soon_count: u32,
}

impl PortfolioSummary {
    pub fn compute(book: &LoanBook, engine: &AccrualEngine, today: NaiveDate) -> Self {
        let due_soon_until = today + Duration::days(i64::from(engine.config.due_soon_days));
        let mut summary = Self::default();

        for loan in book.open_loans() {
            let evaluation = book.evaluate(loan, engine, today);
            summary.open_loans += 1;
            summary.total_lent += loan.principal;
            summary.total_receivable += evaluation.pending_amount;

            // only active and partial loans count as overdue or due soon
            if !matches!(loan.status, LoanStatus::Active | LoanStatus::Partial) {
                continue;
            }
            match loan.due_date {
                Some(due) if due < today => summary.overdue_count += 1,
                Some(due) if due <= due_soon_until => summary.due_soon_count += 1,
                _ => {}
            }
        }

        tracing::debug!(
            open_loans = summary.open_loans,
            receivable = %summary.total_receivable,
            "portfolio summary computed"
        );
        summary
    }
}

/// one row of the pending-clients list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingClient {
    pub loan_id: LoanId,
    pub client_id: ClientId,
    pub name: String,
    pub tax_id: String,
    pub phone: String,
    pub due_date: Option<NaiveDate>,
    pub pending_amount: Money,
    pub monthly_amount: Money,
    pub pending_periods: u32,
    pub days_overdue: u32,
    pub loan_status: LoanStatus,
    pub standing: PaymentStanding,
    pub last_payment: Option<LastPayment>,
}

/// open loans with something pending, most overdue first
///
/// Loans whose client row is missing are left out.
pub fn pending_clients(book: &LoanBook, engine: &AccrualEngine, today: NaiveDate) -> Vec<PendingClient> {
    let mut rows: Vec<PendingClient> = book
        .open_loans()
        .filter_map(|loan| {
            let Some(client) = book.client(loan.client_id) else {
                tracing::warn!(loan_id = %loan.id, client_id = %loan.client_id, "loan without client row");
                return None;
            };
            let evaluation = book.evaluate(loan, engine, today);
            if !evaluation.pending_amount.is_positive() {
                return None;
            }

            Some(PendingClient {
                loan_id: loan.id,
                client_id: client.id,
                name: client.name.clone(),
                tax_id: client.tax_id.clone(),
                phone: client.phone.clone(),
                due_date: evaluation.reference_due_date,
                pending_amount: evaluation.pending_amount,
                monthly_amount: evaluation.next_period_amount,
                pending_periods: evaluation.pending_periods,
                days_overdue: evaluation.days_overdue,
                loan_status: loan.status,
                standing: evaluation.standing,
                last_payment: evaluation.last_payment,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));
    rows
}

/// counts and totals over the installments of one loan
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstallmentStats {
    pub total: u32,
    pub paid: u32,
    pub pending: u32,
    pub overdue: u32,
    pub canceled: u32,
    pub total_paid: Money,
    /// scheduled amount of pending installments
    pub pending_amount: Money,
    /// scheduled amount plus booked interest of overdue installments
    pub overdue_amount: Money,
    /// earliest due date among pending installments
    pub next_due: Option<NaiveDate>,
}

impl InstallmentStats {
    pub fn from_installments(installments: &[Installment]) -> Self {
        let mut stats = Self::default();

        for installment in installments {
            stats.total += 1;
            stats.total_paid += installment.paid_amount.non_negative();

            match installment.status {
                InstallmentStatus::Paid => stats.paid += 1,
                InstallmentStatus::Pending => {
                    stats.pending += 1;
                    stats.pending_amount += installment.amount;
                    stats.next_due = match (stats.next_due, installment.due_date) {
                        (Some(current), Some(due)) => Some(current.min(due)),
                        (current, due) => current.or(due),
                    };
                }
                InstallmentStatus::Overdue => {
                    stats.overdue += 1;
                    stats.overdue_amount += installment.amount + installment.accrued_interest;
                }
                InstallmentStatus::Canceled => stats.canceled += 1,
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::payments::schedule::generate_installments;
    use crate::state::InstallmentPlan;
    use crate::types::PaymentKind;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn client(name: &str) -> Client {
        Client {
            id: Uuid::new_v4(),
            name: name.to_string(),
            tax_id: "123.456.789-00".to_string(),
            phone: "(11) 99999-0000".to_string(),
            email: None,
            address: None,
        }
    }

    fn loan_for(client: &Client, principal: i64, due: NaiveDate) -> Loan {
        Loan::builder()
            .client_id(client.id)
            .principal(Money::from_major(principal))
            .monthly_rate(Rate::from_percentage(30))
            .loan_date(date(2024, 1, 1))
            .due_date(due)
            .build()
            .unwrap()
    }

    fn book() -> LoanBook {
        let ana = client("Ana");
        let bruno = client("Bruno");
        let carla = client("Carla");

        let late = loan_for(&ana, 1_000, date(2024, 2, 1));
        let soon = loan_for(&bruno, 2_000, date(2024, 3, 5));
        let mut settled = loan_for(&carla, 500, date(2024, 2, 10));
        settled.status = LoanStatus::Paid;

        LoanBook {
            payments: vec![Payment {
                id: Uuid::new_v4(),
                loan_id: late.id,
                installment_id: None,
                amount: Money::from_major(300),
                paid_on: Some(date(2024, 2, 1)),
                kind: PaymentKind::InterestOnly,
                period: None,
                notes: None,
            }],
            loans: vec![soon, late, settled],
            clients: vec![ana, bruno, carla],
            installments: Vec::new(),
        }
    }

    #[test]
    fn test_summary_over_open_loans() {
        let book = book();
        let summary = PortfolioSummary::compute(&book, &AccrualEngine::default(), date(2024, 3, 1));

        assert_eq!(
            summary,
            PortfolioSummary {
                open_loans: 2,
                total_lent: Money::from_major(3_000),
                // 1300 open on the late loan, 2600 on the one due in four days
                total_receivable: Money::from_major(3_900),
                overdue_count: 1,
                due_soon_count: 1,
            }
        );
    }

    #[test]
    fn test_pending_clients_sorted_by_days_overdue() {
        let book = book();
        let rows = pending_clients(&book, &AccrualEngine::default(), date(2024, 3, 1));

        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno"]);
        assert_eq!(rows[0].days_overdue, 29);
        assert_eq!(rows[0].standing, PaymentStanding::PaidInterest);
        assert_eq!(rows[1].days_overdue, 0);
        assert_eq!(rows[1].standing, PaymentStanding::OnTime);
    }

    #[test]
    fn test_loans_without_client_are_skipped() {
        let mut book = book();
        book.clients.clear();
        assert!(pending_clients(&book, &AccrualEngine::default(), date(2024, 3, 1)).is_empty());
    }

    #[test]
    fn test_installment_stats() {
        let plan = InstallmentPlan::new(4, Money::from_major(250), 30, date(2024, 2, 1));
        let mut installments = generate_installments(Uuid::new_v4(), &plan).unwrap();
        installments[0].status = InstallmentStatus::Paid;
        installments[0].paid_amount = Money::from_major(250);
        installments[1].status = InstallmentStatus::Overdue;
        installments[1].accrued_interest = Money::from_major(15);
        installments[3].status = InstallmentStatus::Canceled;

        let stats = InstallmentStats::from_installments(&installments);
        assert_eq!(
            stats,
            InstallmentStats {
                total: 4,
                paid: 1,
                pending: 1,
                overdue: 1,
                canceled: 1,
                total_paid: Money::from_major(250),
                pending_amount: Money::from_major(250),
                overdue_amount: Money::from_major(265),
                next_due: installments[2].due_date,
            }
        );
    }
}
