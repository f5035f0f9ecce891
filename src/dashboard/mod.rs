//! Dashboard module
//!
//! Provides the overview page with the filter controls, charts and the two
//! interactive pivot tables, plus the endpoints the tables talk to.

mod charts;
mod filters;
mod handlers;
mod session;

pub use handlers::{
    DashboardState, get_dashboard_page, monthly_copy, monthly_pointer, monthly_statistic,
    recipient_copy, recipient_pointer, recipient_statistic, toggle_recipient, update_filters,
};
pub use session::Dashboard;
