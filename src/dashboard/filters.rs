//! The filter controls above the dashboard tables.

use maud::{Markup, html};
use time::Date;

use crate::{
    dashboard::session::Dashboard,
    endpoints,
    html::{FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

const CHECKBOX_LIST_STYLE: &str = "max-h-40 overflow-y-auto space-y-1 p-2 rounded \
    border border-gray-200 dark:border-gray-700 bg-white dark:bg-gray-800";

fn format_date(date: Option<Date>) -> String {
    date.map(|date| date.to_string()).unwrap_or_default()
}

fn format_bound(bound: Option<f64>) -> String {
    bound.map(|bound| bound.to_string()).unwrap_or_default()
}

fn checkbox_list<'a>(
    name: &str,
    title: &str,
    values: impl IntoIterator<Item = &'a str>,
    is_checked: impl Fn(&str) -> bool,
) -> Markup {
    html! {
        fieldset
        {
            legend class=(FORM_LABEL_STYLE) { (title) }

            div class=(CHECKBOX_LIST_STYLE)
            {
                @for value in values {
                    label class="flex items-center gap-2 text-sm"
                    {
                        input
                            type="checkbox"
                            name=(name)
                            value=(value)
                            checked[is_checked(value)]
                            class=(FORM_CHECKBOX_STYLE);

                        span { (value) }
                    }
                }
            }
        }
    }
}

/// The filter form for the loaded dataset.
///
/// Any change posts the whole form and swaps in the refreshed charts and tables.
pub(super) fn filter_form(dashboard: &Dashboard) -> Markup {
    let filter = dashboard.filter();

    html! {
        form
            id="filter-form"
            hx-post=(endpoints::FILTERS_API)
            hx-trigger="change, input changed delay:300ms from:#search"
            hx-target="#dashboard-content"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            class="w-full mb-6 p-4 rounded-lg bg-gray-50 dark:bg-gray-800"
        {
            h3 class="text-xl font-semibold mb-4" { "Filters" }

            div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4"
            {
                div
                {
                    label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                    input
                        id="search"
                        type="search"
                        name="search"
                        value=(filter.search)
                        placeholder="Recipient, status, anything..."
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="grid grid-cols-2 gap-2"
                {
                    div
                    {
                        label for="min_amount" class=(FORM_LABEL_STYLE) { "Min amount" }
                        input
                            id="min_amount"
                            type="number"
                            step="any"
                            name="min_amount"
                            value=(format_bound(filter.min_amount))
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="max_amount" class=(FORM_LABEL_STYLE) { "Max amount" }
                        input
                            id="max_amount"
                            type="number"
                            step="any"
                            name="max_amount"
                            value=(format_bound(filter.max_amount))
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div class="grid grid-cols-2 gap-2"
                {
                    div
                    {
                        label for="date_from" class=(FORM_LABEL_STYLE) { "From" }
                        input
                            id="date_from"
                            type="date"
                            name="date_from"
                            value=(format_date(filter.date_from))
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    div
                    {
                        label for="date_to" class=(FORM_LABEL_STYLE) { "To" }
                        input
                            id="date_to"
                            type="date"
                            name="date_to"
                            value=(format_date(filter.date_to))
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div class="grid grid-cols-1 gap-2"
                {
                    (checkbox_list("statuses", "Status", dashboard.statuses(), |status| {
                        filter.statuses.contains(status)
                    }))
                }
            }

            div class="mt-4"
            {
                (checkbox_list("recipients", "Recipients", dashboard.recipient_names(), |recipient| {
                    filter.recipients.contains(recipient)
                }))
            }
        }
    }
}
