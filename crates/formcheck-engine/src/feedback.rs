//! Per-cycle feedback collection.

use formcheck_core::FeedbackItem;

/// Holds the feedback items of the current analysis cycle.
///
/// Starting a cycle drops everything from the previous one. Items are kept
/// in emission order and never deduplicated; consumers ask for the
/// prioritized view.
#[derive(Debug, Clone, Default)]
pub struct FeedbackAggregator {
    items: Vec<FeedbackItem>,
    cycle: u64,
}

impl FeedbackAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_cycle(&mut self) {
        self.items.clear();
        self.cycle += 1;
    }

    pub fn push(&mut self, item: FeedbackItem) {
        self.items.push(item);
    }

    pub fn extend<I: IntoIterator<Item = FeedbackItem>>(&mut self, items: I) {
        self.items.extend(items);
    }

    /// Items in emission order
    pub fn items(&self) -> &[FeedbackItem] {
        &self.items
    }

    /// Items sorted by descending priority; ties keep emission order
    pub fn prioritized(&self) -> Vec<FeedbackItem> {
        let mut sorted = self.items.clone();
        sorted.sort_by(|a, b| b.priority.cmp(&a.priority));
        sorted
    }

    pub fn top(&self, n: usize) -> Vec<FeedbackItem> {
        let mut top = self.prioritized();
        top.truncate(n);
        top
    }

    pub fn has_corrections(&self) -> bool {
        self.items.iter().any(FeedbackItem::is_correction)
    }

    /// Number of cycles started since construction or the last clear
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.cycle = 0;
    }
}
