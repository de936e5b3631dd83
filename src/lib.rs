pub mod cache;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod interest;
pub mod lifecycle;
pub mod payments;
pub mod portfolio;
pub mod state;
pub mod types;
pub mod voucher;

// re-export key types
pub use cache::ConfigCache;
pub use config::{AccrualConfig, BrandingConfig, BrandingUpdate, FreshnessPolicy, LateInterestPolicy};
pub use decimal::{Money, Rate};
pub use engine::{classify_status, AccrualEngine, LastPayment, LoanEvaluation};
pub use errors::{LendError, Result};
pub use events::{Event, EventStore};
pub use interest::{
    compute_installment_pending, compute_lump_sum_pending, InstallmentPending, LumpSumCalculator,
    LumpSumPending,
};
pub use lifecycle::{refresh_installment_statuses, refresh_loan_status, update_daily_status, StatusRefresh};
pub use payments::{
    billing_periods, generate_installments, BillingPeriodSummary, PaymentHistory, PaymentOutcome,
    PaymentRecorder, PaymentRequest,
};
pub use portfolio::{pending_clients, InstallmentStats, LoanBook, PendingClient, PortfolioSummary};
pub use state::{
    BillingPeriod, Client, Installment, InstallmentPlan, Loan, LoanBuilder, LoanRow, Payment, PaymentRow,
};
pub use types::{
    ClientId, InstallmentId, InstallmentStatus, LoanId, LoanStatus, PaymentId, PaymentKind,
    PaymentStanding, PeriodStatus,
};
pub use voucher::VoucherView;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
