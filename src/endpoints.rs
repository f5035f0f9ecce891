//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The page with the pivot tables, charts and filters.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for uploading transaction JSON files.
pub const UPLOAD_VIEW: &str = "/upload";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to upload JSON files that replace the dataset.
pub const UPLOAD_API: &str = "/api/upload";
/// The route to change the dashboard filter.
pub const FILTERS_API: &str = "/api/filters";

/// The route for pointer events on the year × month table.
pub const MONTHLY_POINTER: &str = "/api/pivot/monthly/pointer";
/// The route to choose the statistic of the year × month table.
pub const MONTHLY_STATISTIC: &str = "/api/pivot/monthly/statistic";
/// The route for the clipboard text of a year × month table value.
pub const MONTHLY_COPY: &str = "/api/pivot/monthly/copy";

/// The route for pointer events on the recipient table.
pub const RECIPIENT_POINTER: &str = "/api/pivot/recipients/pointer";
/// The route to choose the statistic of the recipient table.
pub const RECIPIENT_STATISTIC: &str = "/api/pivot/recipients/statistic";
/// The route to expand or collapse a recipient group.
pub const RECIPIENT_TOGGLE: &str = "/api/pivot/recipients/toggle";
/// The route for the clipboard text of a recipient table value.
pub const RECIPIENT_COPY: &str = "/api/pivot/recipients/copy";
