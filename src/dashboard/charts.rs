//! Chart generation and rendering for the dashboard.
//!
//! This module creates ECharts visualizations from the pivot grids:
//! - **Monthly Amount Chart**: one line per year over the twelve months
//! - **Top Recipients Chart**: the recipients who were sent the most
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::{Line, bar},
};
use maud::{Markup, PreEscaped, html};

use crate::pivot::{RecipientPivot, YearMonth, YearMonthGrid, month_label, year_label};

/// How many recipients the top recipients chart shows.
pub(super) const TOP_RECIPIENT_COUNT: usize = 10;

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Build the dashboard charts from the current grids.
pub(super) fn build_dashboard_charts(
    monthly: &YearMonthGrid,
    recipients: &RecipientPivot,
) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "monthly-amount-chart",
            options: monthly_amount_chart(monthly).to_string(),
        },
        DashboardChart {
            id: "top-recipients-chart",
            options: top_recipients_chart(recipients).to_string(),
        },
    ]
}

/// Renders the chart containers followed by their initialization script.
///
/// htmx runs the script again whenever the section is swapped in after a
/// filter change.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        data-dashboard-chart
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }

            script { (charts_script(charts)) }
        }
    )
}

/// Installs the resize and colour scheme listeners once per page.
///
/// The listeners look the current instances up with `getInstanceByDom`, so
/// charts replaced by an htmx swap are picked up without adding listeners.
const CHART_LISTENERS_SCRIPT: &str = r#"(function() {
    if (typeof echarts === 'undefined' || window.dashboardChartListeners) {
        return;
    }
    window.dashboardChartListeners = true;

    const forEachChart = (callback) => {
        document.querySelectorAll('[data-dashboard-chart]').forEach((chartDom) => {
            const chart = echarts.getInstanceByDom(chartDom);
            if (chart) {
                callback(chart);
            }
        });
    };

    window.addEventListener('resize', () => forEachChart((chart) => chart.resize()));

    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
    darkModeMediaQuery.addEventListener('change', () => {
        const theme = darkModeMediaQuery.matches ? 'dark' : 'default';
        forEachChart((chart) => chart.setTheme(theme));
    });
})();"#;

/// Generates JavaScript initialization code for dashboard charts.
///
/// Each chart replaces any instance left on its container and starts in the
/// current colour scheme.
fn charts_script(charts: &[DashboardChart]) -> PreEscaped<String> {
    let chart_scripts = charts.iter().map(|chart| {
        format!(
            r#"(function() {{
                const chartDom = document.getElementById("{}");
                if (!chartDom || typeof echarts === 'undefined') {{
                    return;
                }}
                const previous = echarts.getInstanceByDom(chartDom);
                if (previous) {{
                    previous.dispose();
                }}
                const chart = echarts.init(chartDom);
                const option = {};
                chart.setOption(option);

                const isDarkMode = window.matchMedia('(prefers-color-scheme: dark)').matches;
                chart.setTheme(isDarkMode ? 'dark' : 'default');
            }})();"#,
            chart.id, chart.options
        )
    });

    let script_content = std::iter::once(CHART_LISTENERS_SCRIPT.to_owned())
        .chain(chart_scripts)
        .collect::<Vec<_>>()
        .join("\n");

    PreEscaped(script_content)
}

pub(super) fn monthly_amount_chart(grid: &YearMonthGrid) -> Chart {
    let labels: Vec<String> = (1..=12).map(month_label).collect();

    let mut chart = Chart::new()
        .title(
            Title::new()
                .text("Monthly amount")
                .subtext("Completed transactions, one line per year"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        );

    for year in grid.years().keys() {
        let values: Vec<f64> = (1..=12)
            .map(|month| {
                YearMonth::new(*year, month)
                    .and_then(|key| grid.cell(&key))
                    .map(|cell| cell.amount)
                    .unwrap_or_default()
            })
            .collect();

        chart = chart.series(
            Line::new()
                .name(year_label(*year))
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(values),
        );
    }

    chart
}

/// The recipients with the largest total amount, largest first.
pub(super) fn top_recipients(pivot: &RecipientPivot, count: usize) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = pivot
        .groups()
        .iter()
        .map(|group| (group.recipient.clone(), group.total.amount))
        .collect();

    totals.sort_by(|(name_a, a), (name_b, b)| b.total_cmp(a).then_with(|| name_a.cmp(name_b)));
    totals.truncate(count);
    totals
}

pub(super) fn top_recipients_chart(pivot: &RecipientPivot) -> Chart {
    // The category axis draws its first entry at the bottom.
    let (labels, values): (Vec<String>, Vec<f64>) = top_recipients(pivot, TOP_RECIPIENT_COUNT)
        .into_iter()
        .rev()
        .unzip();

    Chart::new()
        .title(
            Title::new()
                .text("Top recipients")
                .subtext(format!("Largest {TOP_RECIPIENT_COUNT} by total amount")),
        )
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .y_axis(Axis::new().type_(AxisType::Category).data(labels))
        .series(bar::Bar::new().name("Amount").data(values))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const amountFormatter = new Intl.NumberFormat('ko-KR', {
              maximumFractionDigits: 0
            });
            return (number) ? amountFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for amounts
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
