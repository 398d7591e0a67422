//! Filtered, newest-first views over the transaction list

use crate::models::Transaction;
use crate::types::TransactionKind;

/// Number of transactions a listing shows when no limit is given
pub const DEFAULT_LIMIT: usize = 50;

/// Read-only listing filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    /// `None` lists both kinds
    pub kind: Option<TransactionKind>,
    /// `None` lists every category
    pub category: Option<String>,
    pub limit: usize,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            kind: None,
            category: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn matches(&self, tx: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if tx.kind != kind {
                return false;
            }
        }
        match self.category {
            Some(ref category) => &tx.category_id == category,
            None => true,
        }
    }

    /// Matching transactions, newest `occurred_at` first. Records on the same
    /// day are ordered by `recorded_at`, latest first.
    pub fn run<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        let mut matched: Vec<&Transaction> = transactions.iter().filter(|t| self.matches(t)).collect();
        matched.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.recorded_at.cmp(&a.recorded_at))
        });
        matched.truncate(self.limit);
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TransactionStore;
    use crate::test_support::{date, draft, draft_on, now};
    use chrono::Duration;

    fn store() -> TransactionStore {
        let mut store = TransactionStore::new();
        store.add(draft_on(TransactionKind::Expense, "10", "food", date(2024, 12, 2)), now());
        store.add(draft_on(TransactionKind::Income, "500", "salary", date(2024, 12, 1)), now());
        store.add(draft_on(TransactionKind::Expense, "20", "bills", date(2024, 12, 9)), now());
        store.add(
            draft_on(TransactionKind::Expense, "30", "food", date(2024, 12, 9)),
            now() + Duration::minutes(5),
        );
        store
    }

    #[test]
    fn test_newest_first_with_recorded_tiebreak() {
        let store = store();
        let amounts: Vec<_> = TransactionQuery::new()
            .run(store.list())
            .iter()
            .map(|t| t.amount.to_string())
            .collect();
        assert_eq!(amounts, vec!["30", "20", "10", "500"]);
    }

    #[test]
    fn test_filter_by_kind_and_category() {
        let store = store();
        assert_eq!(TransactionQuery::new().kind(TransactionKind::Income).run(store.list()).len(), 1);

        let food = TransactionQuery::new()
            .kind(TransactionKind::Expense)
            .category("food")
            .run(store.list());
        assert_eq!(food.len(), 2);
        assert!(food.iter().all(|t| t.category_id == "food"));
    }

    #[test]
    fn test_limit() {
        let mut store = TransactionStore::new();
        for _ in 0..60 {
            store.add(draft(TransactionKind::Expense, "1", "other"), now());
        }
        assert_eq!(TransactionQuery::default().run(store.list()).len(), DEFAULT_LIMIT);
        assert_eq!(TransactionQuery::new().limit(3).run(store.list()).len(), 3);
    }
}
