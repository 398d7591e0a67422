//! In-memory transaction store
//!
//! The store exclusively owns the transaction collection and keeps it in
//! insertion order. Callers sort, filter and paginate on their own.

use chrono::{DateTime, Utc};

use crate::models::{Transaction, TransactionDraft};

#[derive(Debug, Clone, Default)]
pub struct TransactionStore {
    records: Vec<Transaction>,
    /// Highest numeric id handed out or seen, so new ids keep increasing
    last_issued: i64,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with records, e.g. after hydration
    pub fn with_records(records: Vec<Transaction>) -> Self {
        let mut store = Self::new();
        store.replace_all(records);
        store
    }

    /// Append a new transaction with a fresh id and `recorded_at = now`
    pub fn add(&mut self, draft: TransactionDraft, now: DateTime<Utc>) -> Transaction {
        let id = self.next_id(now);
        let transaction = Transaction::from_draft(draft, id, now);
        self.records.push(transaction.clone());
        transaction
    }

    /// Replace every record carrying the same id. Returns `false` and leaves
    /// the store untouched when nothing matches.
    pub fn update(&mut self, transaction: Transaction) -> bool {
        let mut matched = false;
        for slot in self.records.iter_mut().filter(|t| t.id == transaction.id) {
            *slot = transaction.clone();
            matched = true;
        }
        matched
    }

    /// Remove every record with this id. Returns `false` when absent.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|t| t.id != id);
        self.records.len() != before
    }

    /// Swap the whole collection
    pub fn replace_all(&mut self, records: Vec<Transaction>) {
        let highest = records
            .iter()
            .filter_map(|t| t.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        self.last_issued = self.last_issued.max(highest);
        self.records = records;
    }

    /// All records in insertion order
    pub fn list(&self) -> &[Transaction] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.records.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Millisecond-based id, strictly greater than any id issued before
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let mut candidate = now.timestamp_millis().max(self.last_issued + 1);
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        self.last_issued = candidate;
        candidate.to_string()
    }
}
