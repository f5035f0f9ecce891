use scraper::{ElementRef, Html, Selector};

/// The one form in `html`.
#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    let selector = Selector::parse("form").expect("Invalid selector");
    let forms: Vec<_> = html.select(&selector).collect();

    assert_eq!(forms.len(), 1, "want exactly one form, got {}", forms.len());
    forms[0]
}

/// Assert that `form` posts to `endpoint` and swaps the response into `target`.
///
/// Errors must always land in the alert container.
#[track_caller]
pub(crate) fn assert_hx_post(form: &ElementRef<'_>, endpoint: &str, target: &str) {
    let attr = |name: &str| form.value().attr(name);

    assert_eq!(attr("hx-post"), Some(endpoint), "wrong hx-post");
    assert_eq!(attr("hx-target"), Some(target), "wrong hx-target");
    assert_eq!(
        attr("hx-target-error"),
        Some("#alert-container"),
        "errors should go to the alert container"
    );
}

/// Assert that `form` has exactly one submit button.
#[track_caller]
pub(crate) fn assert_submit_button(form: &ElementRef<'_>) {
    let selector = Selector::parse(r#"button[type="submit"]"#).expect("Invalid selector");

    assert_eq!(
        form.select(&selector).count(),
        1,
        "want exactly one submit button"
    );
}

/// The `value` of every input named `name` under `element`.
#[track_caller]
pub(crate) fn input_values(element: &ElementRef<'_>, name: &str) -> Vec<String> {
    let selector = Selector::parse(&format!(r#"input[name="{name}"]"#)).expect("Invalid selector");

    element
        .select(&selector)
        .filter_map(|input| input.value().attr("value").map(str::to_owned))
        .collect()
}

/// The `value` of every checked checkbox named `name` under `element`.
#[track_caller]
pub(crate) fn checked_values(element: &ElementRef<'_>, name: &str) -> Vec<String> {
    let selector = Selector::parse(&format!(r#"input[type="checkbox"][name="{name}"][checked]"#))
        .expect("Invalid selector");

    element
        .select(&selector)
        .filter_map(|input| input.value().attr("value").map(str::to_owned))
        .collect()
}
