//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are swapped into the `#alert-container` element that [crate::html::base]
//! places on every page, either as the target of an htmx request or via
//! `hx-target-error`.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// A dismissible message shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action worked.
    Success {
        /// The headline.
        message: String,
        /// A sentence or two about what happened.
        details: String,
    },
    /// The action failed.
    Error {
        /// The headline.
        message: String,
        /// What went wrong and how the user may fix it.
        details: String,
    },
    /// The action failed and there is nothing more to say.
    ErrorSimple {
        /// The headline.
        message: String,
    },
}

impl Alert {
    fn is_error(&self) -> bool {
        !matches!(self, Alert::Success { .. })
    }

    /// Render the alert as a fragment.
    pub fn into_markup(self) -> Markup {
        let style = if self.is_error() {
            "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg shadow
            text-red-800 bg-red-50 border border-red-200
            dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        } else {
            "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg shadow
            text-green-800 bg-green-50 border border-green-200
            dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        };

        let (message, details) = match self {
            Alert::Success { message, details } | Alert::Error { message, details } => {
                (message, details)
            }
            Alert::ErrorSimple { message } => (message, String::new()),
        };

        html! {
            div role="alert" class=(style)
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    onclick="this.closest('[role=alert]').remove()"
                    class="font-bold leading-none hover:opacity-75"
                {
                    "×"
                }
            }
        }
    }

    /// Render the alert as an HTML body.
    pub fn into_html(self) -> Html<String> {
        Html(self.into_markup().into_string())
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status_code = if self.is_error() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        };

        (status_code, self.into_html()).into_response()
    }
}
