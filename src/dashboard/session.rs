//! The loaded dataset and everything derived from it.

use std::collections::BTreeSet;

use time::UtcOffset;

use crate::{
    pivot::{
        DRAG_THROTTLE_INTERVAL, PivotView, RecipientGrid, YearMonthGrid, aggregate,
        aggregate_by_recipient,
    },
    transaction::{Transaction, TransactionFilter},
};

/// The transactions shown on the dashboard, the active filter and the two
/// pivot tables built from them.
///
/// The grids are only rebuilt when the transactions or the filter change;
/// pointer events and statistic changes work on the cached grids.
#[derive(Debug, Clone)]
pub struct Dashboard {
    transactions: Vec<Transaction>,
    filter: TransactionFilter,
    offset: UtcOffset,
    filtered_count: usize,
    monthly: PivotView<YearMonthGrid>,
    recipients: PivotView<RecipientGrid>,
}

impl Dashboard {
    /// An empty dashboard that derives dates in `offset`.
    pub fn new(offset: UtcOffset) -> Self {
        Self {
            transactions: Vec::new(),
            filter: TransactionFilter::default(),
            offset,
            filtered_count: 0,
            monthly: PivotView::new(YearMonthGrid::default()),
            recipients: PivotView::throttled(RecipientGrid::default(), DRAG_THROTTLE_INTERVAL),
        }
    }

    /// A dashboard showing `transactions`.
    pub fn with_transactions(transactions: Vec<Transaction>, offset: UtcOffset) -> Self {
        let mut dashboard = Self::new(offset);
        dashboard.replace_transactions(transactions);
        dashboard
    }

    /// Every loaded transaction, in upload order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The offset used to turn timestamps into local dates.
    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// The active filter.
    pub fn filter(&self) -> &TransactionFilter {
        &self.filter
    }

    /// How many transactions pass the active filter.
    pub fn filtered_count(&self) -> usize {
        self.filtered_count
    }

    /// Replace the dataset.
    ///
    /// The filter is reset because its statuses and recipients refer to the
    /// old data.
    pub fn replace_transactions(&mut self, transactions: Vec<Transaction>) {
        tracing::info!("Replacing dataset with {} transactions", transactions.len());

        self.transactions = transactions;
        self.filter = TransactionFilter::default();
        self.refresh();
    }

    /// Change the filter and rebuild the tables.
    pub fn set_filter(&mut self, filter: TransactionFilter) {
        tracing::debug!("Applying filter {filter:?}");

        self.filter = filter;
        self.refresh();
    }

    fn refresh(&mut self) {
        let filtered = self.filter.apply(&self.transactions, self.offset);
        self.filtered_count = filtered.len();

        self.monthly
            .replace_grid(aggregate(filtered.iter().copied(), self.offset));
        self.recipients.replace_grid(RecipientGrid::new(aggregate_by_recipient(
            filtered.iter().copied(),
            self.offset,
        )));
    }

    /// The year × month table.
    pub fn monthly(&self) -> &PivotView<YearMonthGrid> {
        &self.monthly
    }

    /// The year × month table, for pointer events and statistic changes.
    pub fn monthly_mut(&mut self) -> &mut PivotView<YearMonthGrid> {
        &mut self.monthly
    }

    /// The recipient table.
    pub fn recipients(&self) -> &PivotView<RecipientGrid> {
        &self.recipients
    }

    /// The recipient table, for pointer events, statistic changes and toggles.
    pub fn recipients_mut(&mut self) -> &mut PivotView<RecipientGrid> {
        &mut self.recipients
    }

    /// The distinct non-blank statuses in the dataset, sorted.
    pub fn statuses(&self) -> BTreeSet<&str> {
        self.transactions
            .iter()
            .map(|transaction| transaction.status.trim())
            .filter(|status| !status.is_empty())
            .collect()
    }

    /// The distinct non-blank recipient names in the dataset, sorted.
    pub fn recipient_names(&self) -> BTreeSet<&str> {
        self.transactions
            .iter()
            .filter_map(Transaction::recipient)
            .collect()
    }
}
