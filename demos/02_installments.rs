/// installments - schedule, daily status refresh and installment payments
use chrono::{Duration, NaiveDate};
use flow_lend_rs::payments::schedule::generate_for_loan;
use flow_lend_rs::payments::PaymentRequest;
use flow_lend_rs::{
    update_daily_status, AccrualEngine, Client, EventStore, InstallmentPlan, InstallmentStats, Loan,
    Money, PaymentKind, PaymentRecorder, Rate, Uuid, VoucherView,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loan_date = NaiveDate::from_ymd_opt(2024, 1, 10).ok_or("invalid date")?;
    let client = Client {
        id: Uuid::new_v4(),
        name: "Carla Nunes".to_string(),
        tax_id: "999.888.777-66".to_string(),
        phone: "(31) 97777-1234".to_string(),
        email: None,
        address: None,
    };

    // R$ 1.200,00 split into four monthly installments
    let plan = InstallmentPlan::split_evenly(
        Money::from_major(1_200),
        4,
        30,
        loan_date + Duration::days(30),
    )?;
    let mut loan = Loan::builder()
        .client_id(client.id)
        .principal(Money::from_major(1_200))
        .daily_late_rate(Rate::from_percentage(1))
        .loan_date(loan_date)
        .installments(plan)
        .build()?;

    let mut events = EventStore::new();
    let mut installments = generate_for_loan(&loan, &mut events)?;
    let recorder = PaymentRecorder::new();
    let engine = AccrualEngine::default();
    let mut payments = Vec::new();

    // first installment paid on time
    let first_due = installments[0].due_date.ok_or("missing due date")?;
    let request = PaymentRequest::new(installments[0].amount, PaymentKind::Installment, first_due)
        .for_installment(installments[0].id);
    let outcome = recorder.record(&mut loan, &mut installments, request, &mut events)?;
    payments.push(outcome.payment);

    // second one runs late
    let today = first_due + Duration::days(40);
    let refresh = update_daily_status(&mut loan, &mut installments, today, &mut events);
    println!("refresh on {}: {} installment(s) overdue, loan {:?}", today, refresh.installments.len(), loan.status);

    let evaluation = engine.evaluate(&loan, &payments, &installments, today);
    println!("pending:      {}", evaluation.pending_amount.format_brl());
    println!("late penalty: {}", evaluation.late_interest.format_brl());
    println!("days overdue: {}", evaluation.days_overdue);

    let stats = InstallmentStats::from_installments(&installments);
    println!("paid {}/{}, overdue {}", stats.paid, stats.total, stats.overdue);

    let voucher = VoucherView::build(&loan, &client, &evaluation, today).with_installments(&installments);
    for line in voucher.lines() {
        println!("  {}", line);
    }

    println!("\nevents:");
    for event in events.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}
