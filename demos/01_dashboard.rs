/// dashboard - portfolio totals and the pending-clients list from json rows
use chrono::{TimeZone, Utc};
use flow_lend_rs::config::LateInterestPolicy;
use flow_lend_rs::{
    pending_clients, AccrualConfig, AccrualEngine, BrandingConfig, ConfigCache, FreshnessPolicy,
    LoanBook, LoanRow, PaymentRow, PortfolioSummary, SafeTimeProvider, TimeSource,
};
use tracing_subscriber::EnvFilter;

const ROWS: &str = r#"{
  "clients": [
    {"id": "7d1f3a52-5b7e-4c8e-9f51-0a6f1d2b3c4d", "name": "Ana Lima", "tax_id": "111.222.333-44", "phone": "(11) 91234-5678"},
    {"id": "2b8c9d10-1e2f-4a3b-8c4d-5e6f7a8b9c0d", "name": "Bruno Dias", "tax_id": "555.666.777-88", "phone": "(21) 99876-5432"}
  ],
  "loans": [
    {"id": "0f6e5d4c-3b2a-4190-8877-665544332211", "cliente_id": "7d1f3a52-5b7e-4c8e-9f51-0a6f1d2b3c4d",
     "valor_principal": 1000.0, "taxa_juros_mensal": 30.0, "taxa_juros_diaria_atraso": 1.0,
     "data_emprestimo": "2024-01-01", "data_vencimento": "2024-02-01", "status": "ativo"},
    {"id": "a1b2c3d4-e5f6-4711-8899-aabbccddeeff", "cliente_id": "2b8c9d10-1e2f-4a3b-8c4d-5e6f7a8b9c0d",
     "valor_principal": 2500.0, "taxa_juros_mensal": 20.0,
     "data_emprestimo": "2024-02-20", "data_vencimento": "2024-03-08", "status": "ativo"}
  ],
  "payments": [
    {"id": "99999999-8888-4777-8666-555555555555", "emprestimo_id": "0f6e5d4c-3b2a-4190-8877-665544332211",
     "valor_pago": 300.0, "data_pagamento": "2024-02-01", "tipo_pagamento": "juros",
     "mes_pagamento": 2, "ano_pagamento": 2024}
  ]
}"#;

#[derive(serde::Deserialize)]
struct Rows {
    clients: Vec<flow_lend_rs::Client>,
    loans: Vec<LoanRow>,
    payments: Vec<PaymentRow>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(),
    ));
    let today = time.now().date_naive();

    // branding is loaded once and reused while fresh
    let mut branding: ConfigCache<BrandingConfig> = ConfigCache::new(FreshnessPolicy::from_seconds(30));
    let name = branding
        .get_or_refresh(&time, || Ok::<_, std::convert::Infallible>(BrandingConfig::default()))?
        .system_name
        .clone();
    println!("=== {} dashboard, {} ===\n", name, today.format("%d/%m/%Y"));

    let rows: Rows = serde_json::from_str(ROWS)?;
    let book = LoanBook {
        loans: rows.loans.into_iter().map(Into::into).collect(),
        clients: rows.clients,
        payments: rows.payments.into_iter().map(Into::into).collect(),
        installments: Vec::new(),
    };

    for (label, policy) in [
        ("periods only", LateInterestPolicy::PeriodsOnly),
        ("stacked daily interest", LateInterestPolicy::Stacked),
    ] {
        let engine = AccrualEngine::new(AccrualConfig::default().with_late_interest_policy(policy));
        let summary = PortfolioSummary::compute(&book, &engine, today);

        println!("-- {} --", label);
        println!("total lent:       {}", summary.total_lent.format_brl());
        println!("total receivable: {}", summary.total_receivable.format_brl());
        println!("overdue loans:    {}", summary.overdue_count);
        println!("due this week:    {}", summary.due_soon_count);

        for row in pending_clients(&book, &engine, today) {
            println!(
                "  {:<12} {:>14} {:>3} days  {}",
                row.name,
                row.pending_amount.format_brl(),
                row.days_overdue,
                row.standing.label()
            );
        }
        println!();
    }

    Ok(())
}
