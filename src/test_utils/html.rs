use axum::{body::Body, response::Response};
use scraper::{Html, Selector};

async fn response_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    String::from_utf8(bytes.to_vec()).expect("Response body is not UTF-8")
}

/// Parse a full page response.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&response_text(response).await)
}

/// Parse an htmx fragment response, e.g. a re-rendered pivot table.
pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&response_text(response).await)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// The trimmed text of every element matching `selector`, in document order.
#[track_caller]
pub(crate) fn select_texts(html: &Html, selector: &str) -> Vec<String> {
    let selector = Selector::parse(selector).expect("Invalid selector");

    html.select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_owned())
        .collect()
}

/// The number of elements matching `selector`.
#[track_caller]
pub(crate) fn count_matches(html: &Html, selector: &str) -> usize {
    let selector = Selector::parse(selector).expect("Invalid selector");
    html.select(&selector).count()
}

/// The coordinates of every selected pivot body cell, in document order.
///
/// The recipient is `None` for cells of the year × month table.
#[track_caller]
pub(crate) fn selected_cells(html: &Html) -> Vec<(Option<String>, i32, u8)> {
    let selector = Selector::parse("td[data-cell].pivot-selected").expect("Invalid selector");

    html.select(&selector)
        .map(|cell| {
            let attr = |name: &str| {
                cell.value()
                    .attr(name)
                    .unwrap_or_else(|| panic!("Selected cell is missing {name}"))
            };

            (
                cell.value().attr("data-recipient").map(str::to_owned),
                attr("data-year").parse().expect("Invalid data-year"),
                attr("data-month").parse().expect("Invalid data-month"),
            )
        })
        .collect()
}
