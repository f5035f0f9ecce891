//! Application router configuration.

use std::path::Path;

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    dashboard::{
        get_dashboard_page, monthly_copy, monthly_pointer, monthly_statistic, recipient_copy,
        recipient_pointer, recipient_statistic, toggle_recipient, update_filters,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    logging::logging_middleware,
    not_found::get_404_not_found,
    upload::{get_upload_page, upload_transactions},
};

/// Return a router with all the app's routes.
///
/// Static files are served from `static_dir`.
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::UPLOAD_VIEW, get(get_upload_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api = Router::new()
        .route(endpoints::UPLOAD_API, post(upload_transactions))
        .route(endpoints::FILTERS_API, post(update_filters))
        .route(endpoints::MONTHLY_POINTER, post(monthly_pointer))
        .route(endpoints::MONTHLY_STATISTIC, post(monthly_statistic))
        .route(endpoints::MONTHLY_COPY, get(monthly_copy))
        .route(endpoints::RECIPIENT_POINTER, post(recipient_pointer))
        .route(endpoints::RECIPIENT_STATISTIC, post(recipient_statistic))
        .route(endpoints::RECIPIENT_TOGGLE, post(toggle_recipient))
        .route(endpoints::RECIPIENT_COPY, get(recipient_copy))
        .layer(middleware::from_fn(logging_middleware));

    pages
        .merge(api)
        .nest_service(endpoints::STATIC, ServeDir::new(static_dir))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
