//! Uploading transaction JSON files.
//!
//! Each upload replaces the dataset shown on the dashboard.

mod endpoint;
mod page;

pub use endpoint::{UploadState, parse_transactions, upload_transactions};
pub use page::get_upload_page;
