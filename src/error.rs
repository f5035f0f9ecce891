//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the lock on the shared dashboard.
    #[error("could not acquire the dashboard lock")]
    DashboardLockError,

    /// An uploaded file was not sent as `application/json`.
    #[error("File is not JSON")]
    NotJson,

    /// The multipart form could not be read.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// An uploaded file was not a JSON array of transaction records.
    #[error("Could not parse the JSON file: {0}")]
    InvalidJson(String),

    /// A pointer or copy request did not name a valid cell.
    #[error("the request does not refer to a cell in the table")]
    MissingCell,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DashboardLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::NotJson => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "File type must be JSON.".to_owned(),
                },
            ),
            Error::MultipartError(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the upload".to_owned(),
                    details,
                },
            ),
            Error::InvalidJson(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Failed to parse JSON".to_owned(),
                    details: format!(
                        "Check that the file is a JSON array of transaction records. {details}"
                    ),
                },
            ),
            Error::MissingCell => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unknown cell".to_owned(),
                    details: "The table may be out of date. Try refreshing the page.".to_owned(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::ErrorSimple {
                    message: "The requested resource could not be found".to_owned(),
                },
            ),
            Error::DashboardLockError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::Error;

    #[test]
    fn upload_errors_are_bad_requests() {
        for error in [
            Error::NotJson,
            Error::MultipartError("truncated".to_owned()),
            Error::InvalidJson("expected `[`".to_owned()),
            Error::MissingCell,
        ] {
            assert_eq!(
                error.into_alert_response().status(),
                StatusCode::BAD_REQUEST
            );
        }
    }

    #[test]
    fn lock_error_renders_internal_server_error_page() {
        let response = Error::DashboardLockError.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_renders_404_page() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
