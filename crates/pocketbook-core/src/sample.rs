//! Demo transactions for trying the tracker out

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::TransactionDraft;
use crate::types::TransactionKind;

/// (amount, kind, category, description, day of month)
const SAMPLE_ROWS: [(i64, TransactionKind, &str, &str, u32); 10] = [
    (5000, TransactionKind::Income, "salary", "Monthly salary", 1),
    (1200, TransactionKind::Expense, "food", "Monthly supermarket run", 2),
    (300, TransactionKind::Expense, "transport", "Car fuel", 3),
    (150, TransactionKind::Expense, "bills", "Electricity bill", 4),
    (800, TransactionKind::Expense, "shopping", "Winter clothes", 5),
    (200, TransactionKind::Expense, "entertainment", "Dinner out with friends", 6),
    (500, TransactionKind::Income, "freelance", "Website design project", 7),
    (100, TransactionKind::Expense, "health", "Dentist visit", 8),
    (75, TransactionKind::Expense, "bills", "Phone bill", 9),
    (250, TransactionKind::Expense, "food", "Weekly takeaway", 10),
];

/// Sample drafts dated inside the month of `today`, never after `today`
pub fn sample_drafts(today: NaiveDate) -> Vec<TransactionDraft> {
    SAMPLE_ROWS
        .iter()
        .map(|&(amount, kind, category, description, day)| TransactionDraft {
            amount: Decimal::from(amount),
            kind,
            category_id: category.to_string(),
            description: description.to_string(),
            occurred_at: today.with_day(day.min(today.day())).unwrap_or(today),
        })
        .collect()
}
