//! Credit estimation and settlement
//!
//! Requests are priced before they run (estimate + balance check) and settled after the
//! response is delivered. The ledger itself is an external service.

pub mod calculator;
pub mod dead_letter;
pub mod estimator;
pub mod ledger;
pub mod service;
pub mod types;


pub use calculator::{CreditEstimator, PriceTable, tokens_to_credits};
pub use dead_letter::{InMemoryDeadLetters, SettlementDeadLetters};
pub use estimator::{HeuristicTokenEstimator, TokenEstimator};
pub use ledger::{HttpLedgerClient, LedgerClient};
pub use service::CreditService;
pub use types::{CreditEstimation, FailedSettlement, SettlementOutcome};
