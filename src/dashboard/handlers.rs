//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for displaying the dashboard and changing its filter
//! - Route handlers for the pointer, statistic, toggle and copy actions of the pivot tables
//! - HTML view functions for rendering the dashboard UI
//! - State and form types used by the handlers

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    dashboard::{
        charts::{build_dashboard_charts, charts_view},
        filters::filter_form,
        session::Dashboard,
    },
    endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base},
    internal_server_error::get_internal_server_error_redirect,
    navigation::NavBar,
    pivot::{
        CopyTarget, PointerEvent, RecipientCell, RecipientRow, RecipientYear, Statistic,
        YearMonth, monthly_pivot, pivot_script, pivot_styles, recipient_pivot,
    },
    transaction::FilterForm,
};

/// The state needed by the dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The loaded dataset and its pivot tables.
    pub dashboard: Arc<Mutex<Dashboard>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            dashboard: state.dashboard.clone(),
        }
    }
}

fn lock_dashboard(state: &DashboardState) -> Result<MutexGuard<'_, Dashboard>, Error> {
    state
        .dashboard
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire dashboard lock: {error}"))
        .map_err(|_| Error::DashboardLockError)
}

/// The kind of pointer event sent by the client script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Down,
    Enter,
    Up,
    Leave,
    Click,
}

/// Form data for a pointer event on one of the pivot tables.
#[derive(Debug, Deserialize)]
pub struct PointerForm {
    pub kind: PointerKind,
    /// Whether ctrl or cmd was held.
    #[serde(default)]
    pub additive: bool,
    /// Only sent by the recipient table.
    pub recipient: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u8>,
}

impl PointerForm {
    fn monthly_cell(&self) -> Option<YearMonth> {
        YearMonth::new(self.year?, self.month?)
    }

    fn recipient_cell(&self) -> Option<RecipientCell> {
        RecipientCell::new(self.recipient.clone()?, self.year?, self.month?)
    }

    /// Build the event, failing if the kind needs a cell but `cell` is `None`.
    fn into_event<C>(self, cell: Option<C>) -> Result<PointerEvent<C>, Error> {
        let additive = self.additive;
        let require_cell = || cell.ok_or(Error::MissingCell);

        Ok(match self.kind {
            PointerKind::Down => PointerEvent::Down {
                cell: require_cell()?,
                additive,
            },
            PointerKind::Enter => PointerEvent::Enter {
                cell: require_cell()?,
            },
            PointerKind::Click => PointerEvent::Click {
                cell: require_cell()?,
                additive,
            },
            PointerKind::Up => PointerEvent::Up,
            PointerKind::Leave => PointerEvent::Leave,
        })
    }
}

/// Form data for choosing the statistic of a table.
#[derive(Debug, Deserialize)]
pub struct StatisticForm {
    pub statistic: Statistic,
}

/// Form data for expanding or collapsing a recipient group.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub recipient: String,
}

/// What the copy menu was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyKind {
    Cell,
    Row,
    /// One month of a row that rolls up other rows.
    Rollup,
    Column,
    Grand,
}

/// Which kind of row total of the recipient table was copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Group,
    Year,
}

/// Query parameters for a copy request.
#[derive(Debug, Deserialize)]
pub struct CopyQuery {
    pub target: CopyKind,
    pub row: Option<RowKind>,
    pub recipient: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u8>,
}

impl CopyQuery {
    fn column(&self) -> Option<u8> {
        self.month.filter(|month| (1..=12).contains(month))
    }

    fn monthly_target(&self) -> Option<CopyTarget<YearMonth, i32>> {
        Some(match self.target {
            CopyKind::Cell => CopyTarget::Cell(YearMonth::new(self.year?, self.month?)?),
            CopyKind::Row => CopyTarget::Row(self.year?),
            CopyKind::Rollup => CopyTarget::RowMonth(self.year?, self.column()?),
            CopyKind::Column => CopyTarget::Column(self.column()?),
            CopyKind::Grand => CopyTarget::Grand,
        })
    }

    fn recipient_row(&self) -> Option<RecipientRow> {
        let recipient = self.recipient.clone()?;

        Some(match self.row? {
            RowKind::Group => RecipientRow::Group(recipient),
            RowKind::Year => RecipientRow::Year(RecipientYear {
                recipient,
                year: self.year?,
            }),
        })
    }

    fn recipient_target(&self) -> Option<CopyTarget<RecipientCell, RecipientRow>> {
        Some(match self.target {
            CopyKind::Cell => CopyTarget::Cell(RecipientCell::new(
                self.recipient.clone()?,
                self.year?,
                self.month?,
            )?),
            CopyKind::Row => CopyTarget::Row(self.recipient_row()?),
            CopyKind::Rollup => CopyTarget::RowMonth(self.recipient_row()?, self.column()?),
            CopyKind::Column => CopyTarget::Column(self.column()?),
            CopyKind::Grand => CopyTarget::Grand,
        })
    }
}

/// The clipboard text as `text/plain`, or 204 No Content when there is nothing to copy.
fn copy_response(text: Option<String>) -> Response {
    match text {
        Some(text) => text.into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Display the dashboard with its filter, charts and pivot tables.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let dashboard = lock_dashboard(&state)?;
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if dashboard.transactions().is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    Ok(dashboard_view(nav_bar, &dashboard).into_response())
}

/// Apply the filter form and return the refreshed dashboard content.
pub async fn update_filters(
    State(state): State<DashboardState>,
    Form(form): Form<FilterForm>,
) -> Response {
    let mut dashboard = match lock_dashboard(&state) {
        Ok(dashboard) => dashboard,
        Err(error) => return error.into_alert_response(),
    };

    dashboard.set_filter(form.into());

    dashboard_content(&dashboard).into_response()
}

/// Feed a pointer event to the year × month table and return the table.
pub async fn monthly_pointer(
    State(state): State<DashboardState>,
    Form(form): Form<PointerForm>,
) -> Response {
    let cell = form.monthly_cell();
    let event = match form.into_event(cell) {
        Ok(event) => event,
        Err(error) => {
            tracing::debug!("Rejected pointer event on the monthly table: {error}");
            return error.into_alert_response();
        }
    };

    let Ok(mut dashboard) = lock_dashboard(&state) else {
        return get_internal_server_error_redirect();
    };

    dashboard.monthly_mut().handle(event, Instant::now());

    monthly_pivot(dashboard.monthly()).into_response()
}

/// Feed a pointer event to the recipient table and return the table.
pub async fn recipient_pointer(
    State(state): State<DashboardState>,
    Form(form): Form<PointerForm>,
) -> Response {
    let cell = form.recipient_cell();
    let event = match form.into_event(cell) {
        Ok(event) => event,
        Err(error) => {
            tracing::debug!("Rejected pointer event on the recipient table: {error}");
            return error.into_alert_response();
        }
    };

    let Ok(mut dashboard) = lock_dashboard(&state) else {
        return get_internal_server_error_redirect();
    };

    dashboard.recipients_mut().handle(event, Instant::now());

    recipient_pivot(dashboard.recipients()).into_response()
}

/// Choose the statistic of the year × month table.
pub async fn monthly_statistic(
    State(state): State<DashboardState>,
    Form(form): Form<StatisticForm>,
) -> Response {
    let mut dashboard = match lock_dashboard(&state) {
        Ok(dashboard) => dashboard,
        Err(error) => return error.into_alert_response(),
    };

    dashboard.monthly_mut().set_statistic(form.statistic);

    monthly_pivot(dashboard.monthly()).into_response()
}

/// Choose the statistic of the recipient table.
pub async fn recipient_statistic(
    State(state): State<DashboardState>,
    Form(form): Form<StatisticForm>,
) -> Response {
    let mut dashboard = match lock_dashboard(&state) {
        Ok(dashboard) => dashboard,
        Err(error) => return error.into_alert_response(),
    };

    dashboard.recipients_mut().set_statistic(form.statistic);

    recipient_pivot(dashboard.recipients()).into_response()
}

/// Expand or collapse a recipient group.
///
/// The selection is left alone, so cells hidden by a collapse are still
/// counted by the statistic.
pub async fn toggle_recipient(
    State(state): State<DashboardState>,
    Form(form): Form<ToggleForm>,
) -> Response {
    let mut dashboard = match lock_dashboard(&state) {
        Ok(dashboard) => dashboard,
        Err(error) => return error.into_alert_response(),
    };

    if !dashboard.recipients_mut().grid_mut().toggle(&form.recipient) {
        tracing::debug!("Ignored toggle of unknown recipient {:?}", form.recipient);
    }

    recipient_pivot(dashboard.recipients()).into_response()
}

/// The clipboard text for a value of the year × month table.
pub async fn monthly_copy(
    State(state): State<DashboardState>,
    Query(query): Query<CopyQuery>,
) -> Response {
    let Some(target) = query.monthly_target() else {
        tracing::debug!("Rejected copy request {query:?}");
        return Error::MissingCell.into_alert_response();
    };

    match lock_dashboard(&state) {
        Ok(dashboard) => copy_response(dashboard.monthly().copy_text(&target)),
        Err(error) => error.into_alert_response(),
    }
}

/// The clipboard text for a value of the recipient table.
pub async fn recipient_copy(
    State(state): State<DashboardState>,
    Query(query): Query<CopyQuery>,
) -> Response {
    let Some(target) = query.recipient_target() else {
        tracing::debug!("Rejected copy request {query:?}");
        return Error::MissingCell.into_alert_response();
    };

    match lock_dashboard(&state) {
        Ok(dashboard) => copy_response(dashboard.recipients().copy_text(&target)),
        Err(error) => error.into_alert_response(),
    }
}

/// Renders the dashboard page when no transactions have been uploaded.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "The tables and charts will show up here once you "
                a
                    href=(endpoints::UPLOAD_VIEW)
                    class="text-blue-600 hover:text-blue-500 dark:text-blue-500 underline"
                {
                    "upload"
                }
                " a JSON file of transactions."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// The part of the dashboard that changes with the filter.
fn dashboard_content(dashboard: &Dashboard) -> Markup {
    let charts = build_dashboard_charts(
        dashboard.monthly().grid(),
        dashboard.recipients().grid().pivot(),
    );

    html!(
        p class="w-full mb-4 text-sm text-gray-600 dark:text-gray-400"
        {
            "Showing " (dashboard.filtered_count()) " of "
            (dashboard.transactions().len()) " transactions."
        }

        (charts_view(&charts))

        section class="w-full mb-8"
        {
            h3 class="text-xl font-semibold mb-2" { "By month" }
            (monthly_pivot(dashboard.monthly()))
        }

        section class="w-full mb-24 lg:mb-8"
        {
            h3 class="text-xl font-semibold mb-2" { "By recipient" }
            (recipient_pivot(dashboard.recipients()))
        }
    )
}

/// Renders the main dashboard page with the filter form, charts and tables.
fn dashboard_view(nav_bar: NavBar<'_>, dashboard: &Dashboard) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (filter_form(dashboard))

            div id="dashboard-content" class="w-full"
            {
                (dashboard_content(dashboard))
            }
        }
    );

    let head_elements = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        pivot_styles(),
        pivot_script(),
    ];

    base("Dashboard", &head_elements, &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use scraper::{Html, Selector};
    use serde_json::json;
    use time::UtcOffset;

    use crate::{
        dashboard::session::Dashboard,
        pivot::{Statistic, YearMonth},
        test_utils::{
            assert_valid_html, count_matches, parse_html_document, parse_html_fragment,
            selected_cells,
        },
        transaction::{FilterForm, Transaction},
    };

    use super::{
        CopyKind, CopyQuery, DashboardState, PointerForm, PointerKind, RowKind, StatisticForm,
        ToggleForm, get_dashboard_page, monthly_copy, monthly_pointer, monthly_statistic,
        recipient_copy, recipient_pointer, toggle_recipient, update_filters,
    };

    fn transactions() -> Vec<Transaction> {
        serde_json::from_value(json!([
            {"status": "completed", "finished": "2022-03-05T00:00:00Z", "sourceAmt": 1000, "reciFullName": "Bob"},
            {"status": "completed", "finished": "2022-04-05T00:00:00Z", "sourceAmt": 2500, "reciFullName": "Alice"},
            {"status": "completed", "finished": "2023-03-05T00:00:00Z", "sourceAmt": 1234567, "reciFullName": "Alice"},
            {"status": "pending", "finished": "2023-04-05T00:00:00Z", "sourceAmt": 99, "reciFullName": "Carol"},
        ]))
        .unwrap()
    }

    fn state_with(transactions: Vec<Transaction>) -> DashboardState {
        DashboardState {
            dashboard: Arc::new(Mutex::new(Dashboard::with_transactions(
                transactions,
                UtcOffset::UTC,
            ))),
        }
    }

    fn pointer(kind: PointerKind, year: i32, month: u8) -> PointerForm {
        PointerForm {
            kind,
            additive: false,
            recipient: None,
            year: Some(year),
            month: Some(month),
        }
    }

    fn release() -> PointerForm {
        PointerForm {
            kind: PointerKind::Up,
            additive: false,
            recipient: None,
            year: None,
            month: None,
        }
    }

    fn copy_query(target: CopyKind) -> CopyQuery {
        CopyQuery {
            target,
            row: None,
            recipient: None,
            year: None,
            month: None,
        }
    }

    async fn body_text(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8_lossy(&body).to_string()
    }

    #[tokio::test]
    async fn dashboard_page_shows_both_tables_and_charts() {
        let response = get_dashboard_page(State(state_with(transactions())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        for selector in [
            "#monthly-pivot table",
            "#recipient-pivot table",
            "#monthly-amount-chart",
            "#top-recipients-chart",
            "#filter-form",
        ] {
            assert_eq!(count_matches(&html, selector), 1, "missing {selector:?}");
        }
    }

    #[tokio::test]
    async fn dashboard_page_prompts_for_upload_without_data() {
        let response = get_dashboard_page(State(state_with(Vec::new())))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert!(count_matches(&html, r#"a[href="/upload"]"#) >= 1);
        assert_eq!(count_matches(&html, "table"), 0);
    }

    #[tokio::test]
    async fn drag_selects_a_rectangle_and_returns_the_table() {
        let state = state_with(transactions());

        monthly_pointer(
            State(state.clone()),
            Form(pointer(PointerKind::Down, 2022, 3)),
        )
        .await;
        monthly_pointer(
            State(state.clone()),
            Form(pointer(PointerKind::Enter, 2023, 4)),
        )
        .await;
        let response = monthly_pointer(State(state.clone()), Form(release())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_eq!(
            selected_cells(&html),
            vec![(None, 2022, 3), (None, 2022, 4), (None, 2023, 3), (None, 2023, 4)]
        );

        let dashboard = state.dashboard.lock().unwrap();
        assert_eq!(dashboard.monthly().statistic_value(), 1_238_067.0);
        assert!(dashboard.recipients().selection().is_empty());
    }

    #[tokio::test]
    async fn pointer_event_without_a_cell_is_rejected() {
        let state = state_with(transactions());
        let mut form = release();
        form.kind = PointerKind::Down;

        let response = monthly_pointer(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn recipient_pointer_uses_recipient_coordinates() {
        let state = state_with(transactions());
        let form = PointerForm {
            kind: PointerKind::Click,
            additive: false,
            recipient: Some("Alice".to_owned()),
            year: Some(2023),
            month: Some(3),
        };

        let response = recipient_pointer(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let dashboard = state.dashboard.lock().unwrap();
        assert_eq!(dashboard.recipients().statistic_value(), 1_234_567.0);
        assert!(dashboard.monthly().selection().is_empty());
    }

    #[tokio::test]
    async fn statistic_change_is_kept_per_table() {
        let state = state_with(transactions());

        monthly_statistic(
            State(state.clone()),
            Form(StatisticForm {
                statistic: Statistic::Count,
            }),
        )
        .await;

        let dashboard = state.dashboard.lock().unwrap();
        assert_eq!(dashboard.monthly().statistic(), Statistic::Count);
        assert_eq!(dashboard.recipients().statistic(), Statistic::Sum);
    }

    #[tokio::test]
    async fn toggle_collapses_a_group_but_keeps_the_selection() {
        let state = state_with(transactions());
        recipient_pointer(
            State(state.clone()),
            Form(PointerForm {
                kind: PointerKind::Click,
                additive: false,
                recipient: Some("Alice".to_owned()),
                year: Some(2022),
                month: Some(4),
            }),
        )
        .await;

        let response = toggle_recipient(
            State(state.clone()),
            Form(ToggleForm {
                recipient: "Alice".to_owned(),
            }),
        )
        .await;

        let html = parse_html_fragment(response).await;
        assert_eq!(
            count_matches(&html, r#"td[data-cell][data-recipient="Alice"]"#),
            0
        );

        let dashboard = state.dashboard.lock().unwrap();
        assert!(!dashboard.recipients().grid().is_expanded("Alice"));
        assert_eq!(dashboard.recipients().selection().len(), 1);
    }

    #[tokio::test]
    async fn filter_change_refreshes_content_and_clears_selection() {
        let state = state_with(transactions());
        monthly_pointer(
            State(state.clone()),
            Form(pointer(PointerKind::Click, 2022, 3)),
        )
        .await;

        let response = update_filters(
            State(state.clone()),
            Form(FilterForm {
                recipients: vec!["Alice".to_owned()],
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = Html::parse_fragment(&body_text(response).await);
        let summary = Selector::parse("p").unwrap();
        let summary: String = html
            .select(&summary)
            .next()
            .map(|p| p.text().collect())
            .unwrap_or_default();
        assert_eq!(summary, "Showing 2 of 4 transactions.");

        let dashboard = state.dashboard.lock().unwrap();
        assert!(dashboard.monthly().selection().is_empty());
        assert_eq!(dashboard.monthly().grid().grand_total().amount, 1_237_067.0);
    }

    #[tokio::test]
    async fn copy_returns_formatted_amount() {
        let state = state_with(transactions());
        let query = CopyQuery {
            year: Some(2023),
            month: Some(3),
            ..copy_query(CopyKind::Cell)
        };

        let response = monthly_copy(State(state.clone()), Query(query)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "1,234,567");

        let response = monthly_copy(State(state), Query(copy_query(CopyKind::Grand))).await;
        assert_eq!(body_text(response).await, "1,238,067");
    }

    #[tokio::test]
    async fn copy_of_zero_amount_has_no_content() {
        let state = state_with(transactions());
        let query = CopyQuery {
            year: Some(2022),
            month: Some(1),
            ..copy_query(CopyKind::Cell)
        };

        let response = monthly_copy(State(state), Query(query)).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn recipient_copy_resolves_group_and_year_rows() {
        let state = state_with(transactions());
        let group = CopyQuery {
            row: Some(RowKind::Group),
            recipient: Some("Alice".to_owned()),
            ..copy_query(CopyKind::Row)
        };
        let year = CopyQuery {
            row: Some(RowKind::Year),
            recipient: Some("Alice".to_owned()),
            year: Some(2022),
            ..copy_query(CopyKind::Row)
        };

        let group = recipient_copy(State(state.clone()), Query(group)).await;
        let year = recipient_copy(State(state), Query(year)).await;

        assert_eq!(body_text(group).await, "1,237,067");
        assert_eq!(body_text(year).await, "2,500");
    }

    #[tokio::test]
    async fn recipient_copy_resolves_group_months() {
        let state = state_with(transactions());
        let rollup = |month| CopyQuery {
            row: Some(RowKind::Group),
            recipient: Some("Alice".to_owned()),
            month: Some(month),
            ..copy_query(CopyKind::Rollup)
        };

        let with_amount = recipient_copy(State(state.clone()), Query(rollup(4))).await;
        let empty = recipient_copy(State(state.clone()), Query(rollup(7))).await;
        let missing_row = recipient_copy(
            State(state),
            Query(CopyQuery {
                month: Some(4),
                ..copy_query(CopyKind::Rollup)
            }),
        )
        .await;

        assert_eq!(body_text(with_amount).await, "2,500");
        assert_eq!(empty.status(), StatusCode::NO_CONTENT);
        assert_eq!(missing_row.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn copy_with_missing_coordinates_is_rejected() {
        let state = state_with(transactions());
        let query = CopyQuery {
            month: Some(13),
            ..copy_query(CopyKind::Column)
        };

        let response = monthly_copy(State(state), Query(query)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn pointer_form_decodes_client_fields() {
        let form: PointerForm =
            serde_html_form::from_str("kind=down&additive=true&year=2022&month=3").unwrap();

        assert_eq!(form.kind, PointerKind::Down);
        assert!(form.additive);
        assert_eq!(form.monthly_cell(), YearMonth::new(2022, 3));
        assert_eq!(form.recipient_cell(), None);
    }
}
