//! Implements a struct that holds the state of the server.

use std::sync::{Arc, Mutex};

use crate::{Error, dashboard::Dashboard, timezone::get_local_offset, transaction::Transaction};

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Seoul".
    pub local_timezone: String,

    /// The loaded transactions and the pivot tables built from them.
    pub dashboard: Arc<Mutex<Dashboard>>,
}

impl AppState {
    /// Create a new [AppState] showing `transactions`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Asia/Seoul".
    /// Transaction timestamps are bucketed into months in this timezone.
    ///
    /// # Errors
    /// Returns an [Error::InvalidTimezoneError] if `local_timezone` is not a known timezone.
    pub fn new(local_timezone: &str, transactions: Vec<Transaction>) -> Result<Self, Error> {
        let offset = get_local_offset(local_timezone).ok_or_else(|| {
            tracing::error!("Invalid timezone {}", local_timezone);
            Error::InvalidTimezoneError(local_timezone.to_owned())
        })?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            dashboard: Arc::new(Mutex::new(Dashboard::with_transactions(
                transactions,
                offset,
            ))),
        })
    }
}
