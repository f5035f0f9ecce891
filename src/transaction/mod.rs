//! Remittance transactions.
//!
//! This module contains:
//! - The `Transaction` record and the rules for reading its completion state, amount and date
//! - The filter pipeline that narrows the uploaded transactions before aggregation

mod filter;
mod record;

pub use filter::{FilterForm, TransactionFilter};
pub use record::{COMPLETED_STATUSES, Transaction, parse_local_date};
