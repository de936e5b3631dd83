/// quick start - evaluate a lump-sum loan after a partial payment
use chrono::NaiveDate;
use flow_lend_rs::payments::PaymentRequest;
use flow_lend_rs::{AccrualEngine, EventStore, Loan, Money, PaymentKind, PaymentRecorder, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loan_date = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid date")?;
    let due_date = NaiveDate::from_ymd_opt(2024, 2, 1).ok_or("invalid date")?;
    let today = NaiveDate::from_ymd_opt(2024, 3, 5).ok_or("invalid date")?;

    // R$ 1.000,00 at 30% a month, due in one month
    let mut loan = Loan::builder()
        .principal(Money::from_major(1_000))
        .monthly_rate(Rate::from_percentage(30))
        .loan_date(loan_date)
        .due_date(due_date)
        .build()?;

    // client pays only the interest on the due date
    let mut events = EventStore::new();
    let outcome = PaymentRecorder::new().record(
        &mut loan,
        &mut [],
        PaymentRequest::new(Money::from_major(300), PaymentKind::InterestOnly, due_date),
        &mut events,
    )?;
    let payments = vec![outcome.payment];

    let evaluation = AccrualEngine::default().evaluate(&loan, &payments, &[], today);
    println!("monthly amount: {}", evaluation.next_period_amount.format_brl());
    println!("pending today:  {}", evaluation.pending_amount.format_brl());
    println!("open periods:   {}", evaluation.pending_periods);
    println!("days overdue:   {}", evaluation.days_overdue);
    println!("standing:       {}", evaluation.standing.label());

    Ok(())
}
