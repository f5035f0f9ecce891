#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use form::{
    assert_hx_post, assert_submit_button, checked_values, input_values, must_get_form,
};
pub(crate) use html::{
    assert_valid_html, count_matches, parse_html_document, parse_html_fragment, select_texts,
    selected_cells,
};
pub(crate) use http::{assert_content_type, get_header};
