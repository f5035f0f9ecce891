use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use axum::{
    extract::{FromRef, Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{AppState, Error, alert::Alert, dashboard::Dashboard, transaction::Transaction};

/// The state needed for uploading transactions.
#[derive(Debug, Clone)]
pub struct UploadState {
    /// The dashboard whose dataset the upload replaces.
    pub dashboard: Arc<Mutex<Dashboard>>,
}

impl FromRef<AppState> for UploadState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            dashboard: state.dashboard.clone(),
        }
    }
}

/// Parse a JSON array of transaction records.
///
/// # Errors
/// Returns an [Error::InvalidJson] if `text` is not a JSON array of objects.
pub fn parse_transactions(text: &str) -> Result<Vec<Transaction>, Error> {
    serde_json::from_str(text).map_err(|error| Error::InvalidJson(error.to_string()))
}

/// Route handler for uploading transaction JSON files.
///
/// The records of every uploaded file, in upload order, replace the
/// dashboard's dataset. Nothing is replaced if any file is rejected.
pub async fn upload_transactions(
    State(state): State<UploadState>,
    mut multipart: Multipart,
) -> Result<Response, Response> {
    let start_time = Instant::now();
    let mut transactions = Vec::new();
    let mut file_count = 0;

    loop {
        let field = multipart
            .next_field()
            .await
            .inspect_err(|error| tracing::error!("Could not read multipart form: {error}"))
            .map_err(|error| Error::MultipartError(error.body_text()).into_alert_response())?;

        let Some(field) = field else {
            break;
        };

        let json = parse_multipart_field(field).await.map_err(|error| {
            tracing::debug!("Rejected uploaded file: {error}");
            error.into_alert_response()
        })?;

        let parsed = parse_transactions(&json)
            .inspect_err(|error| tracing::debug!("Failed to parse JSON: {error}"))
            .map_err(Error::into_alert_response)?;

        transactions.extend(parsed);
        file_count += 1;
    }

    if file_count == 0 {
        return Err(
            Error::MultipartError("The form did not contain any files.".to_owned())
                .into_alert_response(),
        );
    }

    let transaction_count = transactions.len();

    state
        .dashboard
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire dashboard lock: {error}"))
        .map_err(|_| Error::DashboardLockError.into_alert_response())?
        .replace_transactions(transactions);

    let duration = start_time.elapsed();
    tracing::info!(
        "Loaded {transaction_count} transactions from {file_count} file(s) in {}ms",
        duration.as_millis()
    );

    let alert = Alert::Success {
        message: "Upload complete".to_owned(),
        details: format!(
            "Loaded {transaction_count} transactions from {file_count} file(s) in {}ms.",
            duration.as_millis()
        ),
    };

    Ok((StatusCode::CREATED, alert.into_html()).into_response())
}

async fn parse_multipart_field(field: Field<'_>) -> Result<String, Error> {
    if field.content_type() != Some("application/json") {
        return Err(Error::NotJson);
    }

    let file_name = match field.file_name() {
        Some(file_name) => file_name.to_owned(),
        None => {
            tracing::error!("Could not get file name from multipart form field: {field:#?}");
            return Err(Error::MultipartError(
                "Could not get file name from multipart form field".to_owned(),
            ));
        }
    };
    let data = match field.text().await {
        Ok(data) => data,
        Err(error) => {
            tracing::error!("Could not read data from multipart form field: {error}");
            return Err(Error::MultipartError(
                "Could not read data from multipart form field.".to_owned(),
            ));
        }
    };

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok(data)
}
