//! HTML rendering of the pivot tables.
//!
//! Each table is rendered as a self-contained fragment so that the pointer,
//! statistic and toggle endpoints can swap it in place. Body cells carry
//! their structured coordinates as data attributes, which the client script
//! posts back as form fields.

use maud::{Markup, PreEscaped, html};

use crate::{
    endpoints,
    html::{HeadElement, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_amount},
    pivot::{
        aggregation::YearMonthGrid,
        cell::{CellData, RecipientCell, RecipientYear, YearMonth, month_label, months, year_label},
        geometry::CellBorders,
        recipient_grid::{RecipientGrid, RecipientRow},
        statistics::Statistic,
        view::{CopyTarget, PivotView},
    },
};

/// The id of the year × month table fragment.
pub const MONTHLY_PIVOT_ID: &str = "monthly-pivot";
/// The id of the recipient table fragment.
pub const RECIPIENT_PIVOT_ID: &str = "recipient-pivot";

const HEADER_CELL_STYLE: &str = "px-3 py-3 text-center min-w-[90px] font-semibold";
const HEADER_FIRST_CELL_STYLE: &str =
    "px-3 py-3 sticky left-0 bg-gray-100 dark:bg-gray-700 z-10 font-semibold text-left";
const ROW_HEADER_STYLE: &str = "px-3 py-2 font-medium text-gray-900 dark:text-white \
    sticky left-0 bg-white dark:bg-gray-800 z-10 text-left whitespace-nowrap";
const BODY_CELL_STYLE: &str = "pivot-cell px-3 py-2 text-center whitespace-nowrap \
    cursor-cell select-none";
const TOTAL_CELL_STYLE: &str = "px-3 py-2 text-center whitespace-nowrap font-semibold \
    bg-gray-50 dark:bg-gray-700";
const ROLLUP_CELL_STYLE: &str = "px-3 py-2 text-center whitespace-nowrap \
    text-gray-700 dark:text-gray-300 italic";

/// The year × month table with its statistic bar.
pub fn monthly_pivot(view: &PivotView<YearMonthGrid>) -> Markup {
    let grid = view.grid();

    html! {
        div
            id=(MONTHLY_PIVOT_ID)
            data-pivot="monthly"
            data-pointer-url=(endpoints::MONTHLY_POINTER)
            data-copy-url=(endpoints::MONTHLY_COPY)
        {
            (statistic_bar(
                MONTHLY_PIVOT_ID,
                endpoints::MONTHLY_STATISTIC,
                view.selection().len(),
                view.statistic(),
                view.statistic_value(),
            ))

            @if grid.is_empty() {
                (empty_message())
            } @else {
                div class="overflow-x-auto rounded-lg shadow" {
                    table class="w-full text-sm text-gray-500 dark:text-gray-400" {
                        thead class=(TABLE_HEADER_STYLE) {
                            tr {
                                th scope="col" class=(HEADER_FIRST_CELL_STYLE) { "" }
                                @for month in months() {
                                    th scope="col" class=(HEADER_CELL_STYLE) { (month_label(month)) }
                                }
                                th scope="col" class=(HEADER_CELL_STYLE) { "합계" }
                            }
                        }

                        tbody {
                            @for year in grid.years().keys() {
                                tr class=(TABLE_ROW_STYLE) {
                                    th scope="row" class=(ROW_HEADER_STYLE) { (year_label(*year)) }

                                    @for month in months() {
                                        @let key = YearMonth { year: *year, month };
                                        @let data = grid.cell(&key).unwrap_or_default();
                                        td
                                            class={(BODY_CELL_STYLE) (selection_classes(view.is_selected(&key), view.borders(&key)))}
                                            data-cell
                                            data-year=(year)
                                            data-month=(month)
                                            data-copy-target="cell"
                                            data-copy-disabled[view.copy_text(&CopyTarget::Cell(key)).is_none()]
                                        {
                                            (cell_content(data))
                                        }
                                    }

                                    @let total = grid.row_total(*year).unwrap_or_default();
                                    td
                                        class=(TOTAL_CELL_STYLE)
                                        data-copy-target="row"
                                        data-year=(year)
                                        data-copy-disabled[view.copy_text(&CopyTarget::Row(*year)).is_none()]
                                    {
                                        (cell_content(total))
                                    }
                                }
                            }
                        }

                        (totals_footer(grid.column_totals(), grid.grand_total(), 1, |target| view.copy_text(target).is_none()))
                    }
                }
            }
        }
    }
}

/// The recipient × year × month table with its statistic bar.
pub fn recipient_pivot(view: &PivotView<RecipientGrid>) -> Markup {
    let grid = view.grid();
    let pivot = grid.pivot();

    html! {
        div
            id=(RECIPIENT_PIVOT_ID)
            data-pivot="recipients"
            data-pointer-url=(endpoints::RECIPIENT_POINTER)
            data-copy-url=(endpoints::RECIPIENT_COPY)
        {
            (statistic_bar(
                RECIPIENT_PIVOT_ID,
                endpoints::RECIPIENT_STATISTIC,
                view.selection().len(),
                view.statistic(),
                view.statistic_value(),
            ))

            @if pivot.is_empty() {
                (empty_message())
            } @else {
                div class="overflow-x-auto rounded-lg shadow" {
                    table class="w-full text-sm text-gray-500 dark:text-gray-400" {
                        thead class=(TABLE_HEADER_STYLE) {
                            tr {
                                th scope="col" class=(HEADER_FIRST_CELL_STYLE) { "수취인" }
                                th scope="col" class=(HEADER_CELL_STYLE) { "연도" }
                                @for month in months() {
                                    th scope="col" class=(HEADER_CELL_STYLE) { (month_label(month)) }
                                }
                                th scope="col" class=(HEADER_CELL_STYLE) { "합계" }
                            }
                        }

                        tbody {
                            @for group in pivot.groups() {
                                @let group_target = CopyTarget::Row(RecipientRow::Group(group.recipient.clone()));

                                @if grid.is_expanded(&group.recipient) {
                                    @for (index, row) in group.rows.iter().enumerate() {
                                        tr class=(TABLE_ROW_STYLE) data-group=(group.recipient) {
                                            @if index == 0 {
                                                th
                                                    scope="rowgroup"
                                                    rowspan=(group.rows.len())
                                                    class={(ROW_HEADER_STYLE) " align-top"}
                                                    data-copy-target="row"
                                                    data-row="group"
                                                    data-recipient=(group.recipient)
                                                    data-copy-disabled[view.copy_text(&group_target).is_none()]
                                                {
                                                    (toggle_button(&group.recipient, true))
                                                }
                                            }

                                            @let row_target = CopyTarget::Row(RecipientRow::Year(RecipientYear {
                                                recipient: group.recipient.clone(),
                                                year: row.year,
                                            }));
                                            th
                                                scope="row"
                                                class="px-3 py-2 text-center whitespace-nowrap font-medium"
                                            {
                                                (year_label(row.year))
                                            }

                                            @for month in months() {
                                                @if let Some(key) = RecipientCell::new(group.recipient.clone(), row.year, month) {
                                                    td
                                                        class={(BODY_CELL_STYLE) (selection_classes(view.is_selected(&key), view.borders(&key)))}
                                                        data-cell
                                                        data-recipient=(group.recipient)
                                                        data-year=(row.year)
                                                        data-month=(month)
                                                        data-copy-target="cell"
                                                        data-copy-disabled[view.copy_text(&CopyTarget::Cell(key.clone())).is_none()]
                                                    {
                                                        (cell_content(row.month(month)))
                                                    }
                                                }
                                            }

                                            td
                                                class=(TOTAL_CELL_STYLE)
                                                data-copy-target="row"
                                                data-row="year"
                                                data-recipient=(group.recipient)
                                                data-year=(row.year)
                                                data-copy-disabled[view.copy_text(&row_target).is_none()]
                                            {
                                                (cell_content(row.total))
                                            }
                                        }
                                    }
                                } @else {
                                    tr class=(TABLE_ROW_STYLE) data-group=(group.recipient) {
                                        th
                                            scope="row"
                                            class=(ROW_HEADER_STYLE)
                                            data-copy-target="row"
                                            data-row="group"
                                            data-recipient=(group.recipient)
                                            data-copy-disabled[view.copy_text(&group_target).is_none()]
                                        {
                                            (toggle_button(&group.recipient, false))
                                        }
                                        td class="px-3 py-2 text-center whitespace-nowrap" {
                                            (group.rows.len()) "개 연도"
                                        }
                                        @for month in months() {
                                            @let rollup_target = CopyTarget::RowMonth(RecipientRow::Group(group.recipient.clone()), month);
                                            td
                                                class=(ROLLUP_CELL_STYLE)
                                                data-copy-target="rollup"
                                                data-row="group"
                                                data-recipient=(group.recipient)
                                                data-month=(month)
                                                data-copy-disabled[view.copy_text(&rollup_target).is_none()]
                                            {
                                                (cell_content(group.month(month)))
                                            }
                                        }
                                        td
                                            class=(TOTAL_CELL_STYLE)
                                            data-copy-target="row"
                                            data-row="group"
                                            data-recipient=(group.recipient)
                                            data-copy-disabled[view.copy_text(&group_target).is_none()]
                                        {
                                            (cell_content(group.total))
                                        }
                                    }
                                }
                            }
                        }

                        (totals_footer(pivot.column_totals(), pivot.grand_total(), 2, |target| view.copy_text(target).is_none()))
                    }
                }
            }
        }
    }
}

/// The footer row with per-month totals and the grand total.
///
/// `is_disabled` decides whether the copy action is offered for a total.
fn totals_footer<C, R>(
    column_totals: &[CellData],
    grand_total: CellData,
    label_span: usize,
    is_disabled: impl Fn(&CopyTarget<C, R>) -> bool,
) -> Markup {
    html! {
        tfoot {
            tr class="font-semibold text-gray-900 dark:text-white bg-gray-100 dark:bg-gray-700" {
                th scope="row" colspan=(label_span) class="px-3 py-3 text-left" { "합계" }

                @for (month, total) in months().zip(column_totals.iter().copied()) {
                    td
                        class=(TOTAL_CELL_STYLE)
                        data-copy-target="column"
                        data-month=(month)
                        data-copy-disabled[is_disabled(&CopyTarget::Column(month))]
                    {
                        (cell_content(total))
                    }
                }

                td
                    class=(TOTAL_CELL_STYLE)
                    data-copy-target="grand"
                    data-copy-disabled[is_disabled(&CopyTarget::Grand)]
                {
                    (cell_content(grand_total))
                }
            }
        }
    }
}

/// The count stacked above the formatted amount, or a dash for an empty cell.
fn cell_content(data: CellData) -> Markup {
    if data.is_empty() {
        return html! { span class="text-gray-400" { "-" } };
    }

    html! {
        div class="text-xs text-gray-500 dark:text-gray-400" { (data.count) "건" }
        div class="text-gray-900 dark:text-white" { (format_amount(data.amount)) }
    }
}

fn selection_classes(selected: bool, borders: CellBorders) -> String {
    if !selected {
        return String::new();
    }

    let mut classes = String::from(" pivot-selected");

    for (outlined, class) in [
        (borders.top, " edge-top"),
        (borders.right, " edge-right"),
        (borders.bottom, " edge-bottom"),
        (borders.left, " edge-left"),
    ] {
        if outlined {
            classes.push_str(class);
        }
    }

    classes
}

fn toggle_button(recipient: &str, expanded: bool) -> Markup {
    let values = serde_json::json!({ "recipient": recipient }).to_string();

    html! {
        button
            type="button"
            class="inline-flex items-center gap-1 hover:text-blue-600 dark:hover:text-blue-400"
            aria-expanded=(expanded)
            hx-post=(endpoints::RECIPIENT_TOGGLE)
            hx-vals=(values)
            hx-target={"#" (RECIPIENT_PIVOT_ID)}
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
        {
            span aria-hidden="true" { @if expanded { "▾" } @else { "▸" } }
            (recipient)
        }
    }
}

fn statistic_bar(
    pivot_id: &str,
    statistic_url: &str,
    selected_count: usize,
    statistic: Statistic,
    value: f64,
) -> Markup {
    let formatted = match statistic {
        Statistic::Count => format!("{value}"),
        _ => format_amount(value),
    };

    html! {
        div class="flex flex-wrap items-center gap-3 mb-2 min-h-[2.5rem] text-sm" {
            @if selected_count > 0 {
                form
                    hx-post=(statistic_url)
                    hx-trigger="change"
                    hx-target={"#" (pivot_id)}
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                {
                    select
                        name="statistic"
                        aria-label="Statistic"
                        class="p-1.5 rounded text-sm bg-gray-50 dark:bg-gray-700 border border-gray-300 dark:border-gray-600"
                    {
                        @for option in Statistic::ALL {
                            option value=(option.as_str()) selected[option == statistic] {
                                (option.label())
                            }
                        }
                    }
                }

                span data-statistic-value class="font-semibold text-gray-900 dark:text-white" {
                    (formatted)
                }
                span class="text-gray-500 dark:text-gray-400" {
                    (selected_count) " cells selected"
                }
            } @else {
                span class="text-gray-500 dark:text-gray-400" {
                    "Drag across cells to select them. Hold Ctrl or ⌘ to add or remove."
                }
            }
        }
    }
}

fn empty_message() -> Markup {
    html! {
        p class="text-gray-500 dark:text-gray-400" {
            "No completed transactions match the current filter."
        }
    }
}

/// Styles for selected cells and the copy menu.
pub fn pivot_styles() -> HeadElement {
    HeadElement::Style(PreEscaped(
        r#"
        .pivot-cell.pivot-selected {
            background-color: rgba(37, 99, 235, 0.12);
        }
        .pivot-cell.edge-top { box-shadow: inset 0 2px 0 #2563eb; }
        .pivot-cell.edge-bottom { box-shadow: inset 0 -2px 0 #2563eb; }
        .pivot-cell.edge-left { border-left: 2px solid #2563eb; }
        .pivot-cell.edge-right { border-right: 2px solid #2563eb; }
        .pivot-cell.edge-top.edge-bottom { box-shadow: inset 0 2px 0 #2563eb, inset 0 -2px 0 #2563eb; }
        #pivot-context-menu {
            position: fixed;
            z-index: 50;
        }
        "#
        .to_owned(),
    ))
}

/// The client side wiring for both tables.
///
/// Pointer events are posted one after another so the server sees them in
/// the order they happened, and each response replaces the table fragment.
pub fn pivot_script() -> HeadElement {
    HeadElement::ScriptSource(PreEscaped(
        r#"
        document.addEventListener('DOMContentLoaded', function() {
            let queue = Promise.resolve();
            let dragging = null;
            let lastCell = null;

            const cellValues = (cell) => {
                const values = {};
                for (const key of ['recipient', 'year', 'month']) {
                    if (cell.dataset[key] !== undefined) {
                        values[key] = cell.dataset[key];
                    }
                }
                return values;
            };

            const send = (pivotId, kind, values) => {
                queue = queue.then(() => {
                    const pivot = document.getElementById(pivotId);
                    if (!pivot) {
                        return;
                    }
                    const body = new URLSearchParams(Object.assign({ kind: kind }, values));
                    return fetch(pivot.dataset.pointerUrl, { method: 'POST', body: body })
                        .then((response) => {
                            const redirect = response.headers.get('HX-Redirect');
                            if (redirect) {
                                window.location.href = redirect;
                                return null;
                            }
                            return response.ok ? response.text() : null;
                        })
                        .then((html) => {
                            if (html !== null) {
                                htmx.swap('#' + pivotId, html, { swapStyle: 'outerHTML' });
                            }
                        });
                }).catch(() => {});
            };

            document.addEventListener('mousedown', (event) => {
                const cell = event.button === 0 && event.target.closest('[data-cell]');
                if (!cell) {
                    return;
                }
                event.preventDefault();
                dragging = cell.closest('[data-pivot]').id;
                lastCell = JSON.stringify(cellValues(cell));
                send(dragging, 'down', Object.assign(
                    { additive: event.ctrlKey || event.metaKey }, cellValues(cell)));
            });

            document.addEventListener('mouseover', (event) => {
                const cell = dragging && event.target.closest('[data-cell]');
                if (!cell || cell.closest('[data-pivot]').id !== dragging) {
                    return;
                }
                const key = JSON.stringify(cellValues(cell));
                if (key !== lastCell) {
                    lastCell = key;
                    send(dragging, 'enter', cellValues(cell));
                }
            });

            document.addEventListener('mouseout', (event) => {
                if (!dragging) {
                    return;
                }
                const pivot = document.getElementById(dragging);
                if (pivot && pivot.contains(event.target) && !pivot.contains(event.relatedTarget)) {
                    send(dragging, 'leave', {});
                    dragging = null;
                }
            });

            document.addEventListener('mouseup', (event) => {
                if (!dragging) {
                    return;
                }
                const pivotId = dragging;
                dragging = null;
                send(pivotId, 'up', {});

                const cell = event.target.closest('[data-cell]');
                if (cell && cell.closest('[data-pivot]').id === pivotId) {
                    send(pivotId, 'click', Object.assign(
                        { additive: event.ctrlKey || event.metaKey }, cellValues(cell)));
                }
            });

            const menu = document.createElement('div');
            menu.id = 'pivot-context-menu';
            menu.className = 'hidden rounded shadow bg-white dark:bg-gray-800 text-sm';
            menu.innerHTML = '<button type="button" class="px-4 py-2 w-full text-left hover:bg-gray-100 dark:hover:bg-gray-700 disabled:text-gray-400">Copy</button>';
            document.body.appendChild(menu);
            const copyButton = menu.querySelector('button');
            let copyRequest = null;

            const legacyCopy = (text) => {
                const textarea = document.createElement('textarea');
                textarea.value = text;
                textarea.style.position = 'fixed';
                textarea.style.opacity = '0';
                document.body.appendChild(textarea);
                textarea.select();
                try {
                    document.execCommand('copy');
                } catch (error) {
                    // Nothing left to try.
                }
                textarea.remove();
            };

            const writeClipboard = (text) => {
                if (navigator.clipboard && navigator.clipboard.writeText) {
                    navigator.clipboard.writeText(text).catch(() => legacyCopy(text));
                } else {
                    legacyCopy(text);
                }
            };

            document.addEventListener('contextmenu', (event) => {
                const target = event.target.closest('[data-copy-target]');
                const pivot = target && target.closest('[data-pivot]');
                if (!pivot) {
                    return;
                }
                event.preventDefault();

                const values = { target: target.dataset.copyTarget };
                for (const key of ['row', 'recipient', 'year', 'month']) {
                    if (target.dataset[key] !== undefined) {
                        values[key] = target.dataset[key];
                    }
                }
                copyRequest = pivot.dataset.copyUrl + '?' + new URLSearchParams(values);
                copyButton.disabled = target.hasAttribute('data-copy-disabled');

                menu.style.left = event.clientX + 'px';
                menu.style.top = event.clientY + 'px';
                menu.classList.remove('hidden');
            });

            copyButton.addEventListener('click', () => {
                menu.classList.add('hidden');
                if (!copyRequest) {
                    return;
                }
                fetch(copyRequest)
                    .then((response) => response.status === 200 ? response.text() : null)
                    .then((text) => {
                        if (text) {
                            writeClipboard(text);
                        }
                    })
                    .catch(() => {});
            });

            document.addEventListener('click', (event) => {
                if (!menu.contains(event.target)) {
                    menu.classList.add('hidden');
                }
            });
        });
        "#
        .to_owned(),
    ))
}
