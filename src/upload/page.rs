use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner},
    navigation::NavBar,
};

fn upload_form_view() -> Markup {
    let upload_route = endpoints::UPLOAD_API;
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(upload_route)
            enctype="multipart/form-data"
            hx-disabled-elt="#files, #submit-button"
            hx-indicator="#indicator"
            hx-target="#alert-container"
            hx-swap="innerHTML"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="files"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Choose file(s) to upload"
                }

                input
                    id="files"
                    type="file"
                    name="files"
                    accept="application/json,.json"
                    placeholder="files"
                    multiple
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                p class="mt-2 text-sm text-gray-600 dark:text-gray-400"
                {
                    "Each file must be a JSON array of transaction records. \
                    The uploaded files replace the transactions currently on the dashboard."
                }
            }

            button
                type="submit"
                id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Upload Files"
            }
        }
    }
}

fn upload_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::UPLOAD_VIEW).into_html();
    let form = upload_form_view();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="relative w-full"
            {
                (form)
            }
        }
    };

    base("Upload Transactions", &[], &content)
}

/// Route handler for the upload page.
pub async fn get_upload_page() -> Response {
    upload_view().into_response()
}
