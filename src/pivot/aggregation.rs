//! Transaction aggregation into pivot grids.
//!
//! Provides the year × month grid and the recipient × year × month pivot,
//! each with row totals, column totals and a grand total. Only completed
//! transactions with a parseable `finished` date are counted.

use std::collections::BTreeMap;

use time::UtcOffset;

use crate::{
    pivot::{
        cell::{CellData, MONTHS_IN_YEAR, RecipientCell, RecipientYear, YearMonth},
        geometry::{AxisIndex, GridGeometry},
        statistics::CellLookup,
        view::PivotTotals,
    },
    transaction::Transaction,
};

/// One cell per month, January first.
pub type MonthCells = [CellData; MONTHS_IN_YEAR];

/// The year × month aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearMonthGrid {
    cells: BTreeMap<YearMonth, CellData>,
    years: AxisIndex<i32>,
    row_totals: BTreeMap<i32, CellData>,
    column_totals: MonthCells,
    grand_total: CellData,
}

impl YearMonthGrid {
    /// The years with at least one counted transaction, ascending.
    pub fn years(&self) -> &AxisIndex<i32> {
        &self.years
    }

    /// The cell at `key`, or `None` if the year has no row.
    ///
    /// Months without transactions in a year that has a row are zero.
    pub fn cell(&self, key: &YearMonth) -> Option<CellData> {
        self.years.position(&key.year)?;
        Some(self.cells.get(key).copied().unwrap_or_default())
    }

    /// The sum across all months of `year`.
    pub fn row_total(&self, year: i32) -> Option<CellData> {
        self.row_totals.get(&year).copied()
    }

    /// The sum down all years of `month` (1 to 12).
    pub fn column_total(&self, month: u8) -> CellData {
        month_cell(&self.column_totals, month)
    }

    /// Every column total, January first.
    pub fn column_totals(&self) -> &MonthCells {
        &self.column_totals
    }

    /// The sum of every counted transaction.
    pub fn grand_total(&self) -> CellData {
        self.grand_total
    }

    /// Whether no transaction was counted.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

impl GridGeometry for YearMonthGrid {
    type Cell = YearMonth;

    fn position(&self, cell: &YearMonth) -> Option<(usize, usize)> {
        let row = self.years.position(&cell.year)?;
        let column = usize::from(cell.month).checked_sub(1)?;
        (column < MONTHS_IN_YEAR).then_some((row, column))
    }

    fn cell_at(&self, row: usize, column: usize) -> Option<YearMonth> {
        let year = *self.years.get(row)?;
        let month = u8::try_from(column + 1).ok()?;
        YearMonth::new(year, month)
    }
}

impl CellLookup<YearMonth> for YearMonthGrid {
    fn cell_data(&self, cell: &YearMonth) -> Option<CellData> {
        self.cell(cell)
    }
}

impl PivotTotals for YearMonthGrid {
    type Row = i32;

    fn row_total(&self, year: &i32) -> Option<CellData> {
        YearMonthGrid::row_total(self, *year)
    }

    fn row_month(&self, year: &i32, month: u8) -> Option<CellData> {
        self.cell(&YearMonth::new(*year, month)?)
    }

    fn column_total(&self, month: u8) -> CellData {
        YearMonthGrid::column_total(self, month)
    }

    fn grand_total(&self) -> CellData {
        self.grand_total
    }
}

/// One year of a recipient's transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct YearRow {
    /// The calendar year.
    pub year: i32,
    /// One cell per month, zero-filled.
    pub months: MonthCells,
    /// The sum across the year.
    pub total: CellData,
}

impl YearRow {
    fn new(year: i32) -> Self {
        Self {
            year,
            months: MonthCells::default(),
            total: CellData::default(),
        }
    }

    /// The cell for `month` (1 to 12).
    pub fn month(&self, month: u8) -> CellData {
        month_cell(&self.months, month)
    }
}

/// All year rows of one recipient plus the recipient roll-up.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientGroup {
    /// The trimmed recipient name.
    pub recipient: String,
    /// Year rows, ascending by year.
    pub rows: Vec<YearRow>,
    /// The roll-up of each month across the recipient's years.
    pub months: MonthCells,
    /// The roll-up of everything sent to the recipient.
    pub total: CellData,
}

impl RecipientGroup {
    /// The roll-up cell for `month` (1 to 12).
    pub fn month(&self, month: u8) -> CellData {
        month_cell(&self.months, month)
    }
}

/// The recipient × year × month aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipientPivot {
    groups: Vec<RecipientGroup>,
    flat_rows: AxisIndex<RecipientYear>,
    column_totals: MonthCells,
    grand_total: CellData,
}

impl RecipientPivot {
    /// The recipient groups, sorted by recipient name.
    pub fn groups(&self) -> &[RecipientGroup] {
        &self.groups
    }

    /// Every year row across all groups, in display order.
    pub fn flat_rows(&self) -> &AxisIndex<RecipientYear> {
        &self.flat_rows
    }

    /// The group for `recipient`.
    pub fn group(&self, recipient: &str) -> Option<&RecipientGroup> {
        self.groups
            .binary_search_by(|group| group.recipient.as_str().cmp(recipient))
            .ok()
            .map(|index| &self.groups[index])
    }

    /// The year row addressed by `key`.
    pub fn year_row(&self, key: &RecipientYear) -> Option<&YearRow> {
        self.group(&key.recipient)?
            .rows
            .iter()
            .find(|row| row.year == key.year)
    }

    /// The body cell addressed by `key`.
    pub fn cell(&self, key: &RecipientCell) -> Option<CellData> {
        self.year_row(&key.row).map(|row| row.month(key.month))
    }

    /// The sum down every recipient's rows for `month` (1 to 12).
    pub fn column_total(&self, month: u8) -> CellData {
        month_cell(&self.column_totals, month)
    }

    /// Every column total, January first.
    pub fn column_totals(&self) -> &MonthCells {
        &self.column_totals
    }

    /// The sum over all included recipients.
    pub fn grand_total(&self) -> CellData {
        self.grand_total
    }

    /// Whether no transaction was counted.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn month_cell(cells: &MonthCells, month: u8) -> CellData {
    usize::from(month)
        .checked_sub(1)
        .and_then(|index| cells.get(index))
        .copied()
        .unwrap_or_default()
}

/// A transaction that passed the completion and date checks.
struct Counted {
    year: i32,
    month: u8,
    amount: f64,
}

/// Keep completed transactions with a parseable date, in input order.
fn counted<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    offset: UtcOffset,
) -> impl Iterator<Item = (&'a Transaction, Counted)> {
    transactions
        .into_iter()
        .filter(|transaction| transaction.is_completed())
        .filter_map(move |transaction| {
            let Some(date) = transaction.finished_date(offset) else {
                tracing::debug!(
                    "skipping transaction with unparseable date {:?}",
                    transaction.finished
                );
                return None;
            };

            Some((
                transaction,
                Counted {
                    year: date.year(),
                    month: u8::from(date.month()),
                    amount: transaction.amount(),
                },
            ))
        })
}

/// Aggregate transactions into a year × month grid.
///
/// Transactions are accumulated in input order so the floating point sums
/// are reproducible for the same input.
pub fn aggregate<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    offset: UtcOffset,
) -> YearMonthGrid {
    let mut cells: BTreeMap<YearMonth, CellData> = BTreeMap::new();
    let mut row_totals: BTreeMap<i32, CellData> = BTreeMap::new();
    let mut column_totals = MonthCells::default();
    let mut grand_total = CellData::default();

    for (_, counted) in counted(transactions, offset) {
        let key = YearMonth {
            year: counted.year,
            month: counted.month,
        };

        cells.entry(key).or_default().record(counted.amount);
        row_totals
            .entry(counted.year)
            .or_default()
            .record(counted.amount);
        column_totals[usize::from(counted.month) - 1].record(counted.amount);
        grand_total.record(counted.amount);
    }

    YearMonthGrid {
        cells,
        years: row_totals.keys().copied().collect(),
        row_totals,
        column_totals,
        grand_total,
    }
}

/// Aggregate transactions into recipient groups of year rows.
///
/// Transactions whose recipient name is blank after trimming are left out
/// entirely, including from the column and grand totals.
pub fn aggregate_by_recipient<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    offset: UtcOffset,
) -> RecipientPivot {
    let mut recipients: BTreeMap<String, BTreeMap<i32, YearRow>> = BTreeMap::new();
    let mut column_totals = MonthCells::default();
    let mut grand_total = CellData::default();

    for (transaction, counted) in counted(transactions, offset) {
        let Some(recipient) = transaction.recipient() else {
            continue;
        };

        let month_index = usize::from(counted.month) - 1;
        let row = recipients
            .entry(recipient.to_owned())
            .or_default()
            .entry(counted.year)
            .or_insert_with(|| YearRow::new(counted.year));

        row.months[month_index].record(counted.amount);
        row.total.record(counted.amount);
        column_totals[month_index].record(counted.amount);
        grand_total.record(counted.amount);
    }

    let groups: Vec<RecipientGroup> = recipients
        .into_iter()
        .map(|(recipient, years)| {
            let rows: Vec<YearRow> = years.into_values().collect();
            let mut months = MonthCells::default();
            let mut total = CellData::default();

            for row in &rows {
                for (rollup, cell) in months.iter_mut().zip(row.months) {
                    *rollup += cell;
                }
                total += row.total;
            }

            RecipientGroup {
                recipient,
                rows,
                months,
                total,
            }
        })
        .collect();

    let flat_rows = groups
        .iter()
        .flat_map(|group| {
            group.rows.iter().map(|row| RecipientYear {
                recipient: group.recipient.clone(),
                year: row.year,
            })
        })
        .collect();

    RecipientPivot {
        groups,
        flat_rows,
        column_totals,
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;
    use time::UtcOffset;

    use crate::{
        pivot::{
            cell::{CellData, RecipientCell, RecipientYear, YearMonth, months},
            geometry::GridGeometry,
        },
        transaction::Transaction,
    };

    use super::{aggregate, aggregate_by_recipient};

    fn transactions(value: serde_json::Value) -> Vec<Transaction> {
        serde_json::from_value(value).expect("Could not deserialize test transactions")
    }

    fn completed(finished: &str, amount: f64, recipient: &str) -> serde_json::Value {
        json!({
            "status": "completed",
            "finished": finished,
            "sourceAmt": amount,
            "reciFullName": recipient,
        })
    }

    fn sample() -> Vec<Transaction> {
        transactions(json!([
            completed("2022-03-01T00:00:00Z", 100.0, "Alice"),
            completed("2022-07-15T00:00:00Z", 250.5, "Bob"),
            completed("2023-03-20T00:00:00Z", 1000.0, "Alice"),
            completed("2023-12-31T00:00:00Z", 0.0, "Carol"),
            completed("2023-12-01T00:00:00Z", -40.0, "   "),
            {"status": "지급완료", "finished": "2024-01-05T00:00:00Z", "localSourceAmt": "75", "sourceAmt": 3, "reciFullName": "Bob"},
            {"status": "pending", "finished": "2023-03-10T00:00:00Z", "sourceAmt": 5000, "reciFullName": "Alice"},
            completed("garbage", 999.0, "Alice"),
        ]))
    }

    #[test]
    fn completed_transactions_in_same_month_are_summed() {
        let transactions = transactions(json!([
            {"status": "completed", "finished": "2023-03-15T00:00:00Z", "sourceAmt": 1000},
            {"status": "completed", "finished": "2023-03-20T00:00:00Z", "sourceAmt": 2000},
            {"status": "pending", "finished": "2023-03-10T00:00:00Z", "sourceAmt": 5000},
        ]));

        let grid = aggregate(&transactions, UtcOffset::UTC);

        let want = CellData {
            count: 2,
            amount: 3000.0,
        };
        assert_eq!(grid.cell(&YearMonth::new(2023, 3).unwrap()), Some(want));
        assert_eq!(grid.grand_total(), want);
        assert_eq!(grid.years().keys(), &[2023]);
    }

    #[test]
    fn totals_agree_with_each_other() {
        let grid = aggregate(&sample(), UtcOffset::UTC);

        let row_sum = grid.years().keys().iter().fold(CellData::default(), |mut sum, year| {
            sum += grid.row_total(*year).unwrap();
            sum
        });
        let column_sum = months().fold(CellData::default(), |mut sum, month| {
            sum += grid.column_total(month);
            sum
        });

        let grand_total = grid.grand_total();
        assert_eq!(grand_total.count, 6);
        assert_eq!(row_sum.count, grand_total.count);
        assert_eq!(column_sum.count, grand_total.count);
        assert!((row_sum.amount - grand_total.amount).abs() < 1e-9);
        assert!((column_sum.amount - grand_total.amount).abs() < 1e-9);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let transactions = sample();

        assert_eq!(
            aggregate(&transactions, UtcOffset::UTC),
            aggregate(&transactions, UtcOffset::UTC)
        );
        assert_eq!(
            aggregate_by_recipient(&transactions, UtcOffset::UTC),
            aggregate_by_recipient(&transactions, UtcOffset::UTC)
        );
    }

    #[test]
    fn pending_and_undated_transactions_never_contribute() {
        let grid = aggregate(&sample(), UtcOffset::UTC);

        // The pending 5000 would land in March 2023, the undated 999 nowhere.
        assert_eq!(
            grid.cell(&YearMonth::new(2023, 3).unwrap()),
            Some(CellData {
                count: 1,
                amount: 1000.0
            })
        );
        assert_eq!(grid.grand_total().amount, 100.0 + 250.5 + 1000.0 + 0.0 - 40.0 + 75.0);
    }

    #[test]
    fn every_year_row_has_all_twelve_months() {
        let grid = aggregate(&sample(), UtcOffset::UTC);

        assert_eq!(grid.years().keys(), &[2022, 2023, 2024]);
        for month in months() {
            assert!(grid.cell(&YearMonth::new(2024, month).unwrap()).is_some());
        }
        assert_eq!(
            grid.cell(&YearMonth::new(2024, 6).unwrap()),
            Some(CellData::default())
        );
        assert_eq!(grid.cell(&YearMonth::new(2019, 6).unwrap()), None);
    }

    #[test]
    fn drag_rectangle_spans_years_and_months() {
        let transactions = transactions(json!([
            completed("2022-01-01T00:00:00Z", 1.0, "Alice"),
            completed("2023-01-01T00:00:00Z", 1.0, "Alice"),
        ]));
        let grid = aggregate(&transactions, UtcOffset::UTC);

        let rectangle = grid
            .rectangle(
                &YearMonth::new(2022, 3).unwrap(),
                &YearMonth::new(2023, 5).unwrap(),
            )
            .unwrap();

        let want: BTreeSet<YearMonth> = [2022, 2023]
            .into_iter()
            .flat_map(|year| (3..=5).map(move |month| YearMonth::new(year, month).unwrap()))
            .collect();
        assert_eq!(rectangle, want);
        assert_eq!(grid.position(&YearMonth::new(2023, 12).unwrap()), Some((1, 11)));
        assert_eq!(grid.cell_at(0, 12), None);
        assert_eq!(grid.position(&YearMonth::new(2021, 1).unwrap()), None);
    }

    #[test]
    fn zero_and_negative_amounts_are_still_counted() {
        let grid = aggregate(&sample(), UtcOffset::UTC);

        assert_eq!(
            grid.cell(&YearMonth::new(2023, 12).unwrap()),
            Some(CellData {
                count: 2,
                amount: -40.0
            })
        );
    }

    #[test]
    fn dates_are_bucketed_in_the_local_offset() {
        let transactions = transactions(json!([completed(
            "2023-03-31T20:00:00Z",
            10.0,
            "Alice"
        )]));
        let kst = UtcOffset::from_hms(9, 0, 0).unwrap();

        let grid = aggregate(&transactions, kst);

        assert_eq!(grid.column_total(4).count, 1);
        assert_eq!(grid.column_total(3).count, 0);
    }

    #[test]
    fn recipients_are_sorted_with_years_ascending() {
        let pivot = aggregate_by_recipient(&sample(), UtcOffset::UTC);

        let names: Vec<_> = pivot.groups().iter().map(|g| g.recipient.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);

        let alice = pivot.group("Alice").unwrap();
        let years: Vec<_> = alice.rows.iter().map(|row| row.year).collect();
        assert_eq!(years, vec![2022, 2023]);

        let flat: Vec<_> = pivot
            .flat_rows()
            .keys()
            .iter()
            .map(|row| (row.recipient.as_str(), row.year))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("Alice", 2022),
                ("Alice", 2023),
                ("Bob", 2022),
                ("Bob", 2024),
                ("Carol", 2023)
            ]
        );
    }

    #[test]
    fn blank_recipients_are_excluded_from_groups_and_totals() {
        let transactions = transactions(json!([
            completed("2023-01-01T00:00:00Z", 10.0, "   "),
            completed("2023-01-01T00:00:00Z", 20.0, ""),
            completed("2023-01-01T00:00:00Z", 30.0, "Dana"),
        ]));

        let pivot = aggregate_by_recipient(&transactions, UtcOffset::UTC);

        assert_eq!(pivot.groups().len(), 1);
        assert_eq!(
            pivot.grand_total(),
            CellData {
                count: 1,
                amount: 30.0
            }
        );
        assert_eq!(pivot.column_total(1).count, 1);
    }

    #[test]
    fn recipient_rollup_sums_year_rows() {
        let pivot = aggregate_by_recipient(&sample(), UtcOffset::UTC);

        let alice = pivot.group("Alice").unwrap();
        assert_eq!(
            alice.month(3),
            CellData {
                count: 2,
                amount: 1100.0
            }
        );
        assert_eq!(
            alice.total,
            CellData {
                count: 2,
                amount: 1100.0
            }
        );

        let bob_2024 = RecipientCell::new("Bob", 2024, 1).unwrap();
        assert_eq!(
            pivot.cell(&bob_2024),
            Some(CellData {
                count: 1,
                amount: 75.0
            })
        );
        assert_eq!(
            pivot
                .year_row(&RecipientYear {
                    recipient: "Bob".to_owned(),
                    year: 2022
                })
                .map(|row| row.total.amount),
            Some(250.5)
        );
    }

    #[test]
    fn recipient_totals_agree_with_each_other() {
        let pivot = aggregate_by_recipient(&sample(), UtcOffset::UTC);

        let group_count: u64 = pivot.groups().iter().map(|g| g.total.count).sum();
        let group_amount: f64 = pivot.groups().iter().map(|g| g.total.amount).sum();
        let column_count: u64 = months().map(|m| pivot.column_total(m).count).sum();

        assert_eq!(group_count, pivot.grand_total().count);
        assert_eq!(column_count, pivot.grand_total().count);
        assert!((group_amount - pivot.grand_total().amount).abs() < 1e-9);
    }
}
