//! Statistics engine
//!
//! `compute_stats` is a pure function of the transaction slice, the
//! category registry and the current day. It is recomputed in full after
//! every change to the transaction set; there is no incremental update.
//!
//! Sums saturate at the `Decimal` bounds instead of overflowing, so a
//! record set that slipped past amount validation still yields a summary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::category::CategoryRegistry;
use crate::models::Transaction;
use crate::time::MonthWindow;
use crate::types::TransactionKind;

/// One category's share of the current month's expenses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category_id: String,
    /// English catalog name, or the raw id for unknown categories. Hosts
    /// showing another locale relabel through `category_id`.
    #[serde(rename = "category")]
    pub label: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Share of monthly expenses in percent; zero when there are none
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
    pub color: String,
    /// Whether the id was found in the catalog
    pub resolved: bool,
}

/// Derived financial summary. Never stored; replaced on every change.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    /// `total_income - total_expenses`; may be negative
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_expenses: Decimal,
    /// In order of first appearance among this month's expenses
    pub category_breakdown: Vec<CategoryShare>,
}

impl Stats {
    /// Net result of the current month
    pub fn monthly_balance(&self) -> Decimal {
        self.monthly_income.saturating_sub(self.monthly_expenses)
    }

    /// The `n` largest categories by amount; ties keep discovery order
    pub fn top_categories(&self, n: usize) -> Vec<&CategoryShare> {
        let mut shares: Vec<&CategoryShare> = self.category_breakdown.iter().collect();
        shares.sort_by(|a, b| b.amount.cmp(&a.amount));
        shares.truncate(n);
        shares
    }
}

/// Derive the summary for `transactions` as of `today`
pub fn compute_stats(
    transactions: &[Transaction],
    registry: &CategoryRegistry,
    today: NaiveDate,
) -> Stats {
    let window = MonthWindow::containing(today);

    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut monthly_income = Decimal::ZERO;
    let mut monthly_expenses = Decimal::ZERO;

    // (category id, summed amount) in discovery order
    let mut groups: Vec<(&str, Decimal)> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();

    for tx in transactions {
        let in_month = window.contains(&tx.occurred_at);
        match tx.kind {
            TransactionKind::Income => {
                total_income = total_income.saturating_add(tx.amount);
                if in_month {
                    monthly_income = monthly_income.saturating_add(tx.amount);
                }
            }
            TransactionKind::Expense => {
                total_expenses = total_expenses.saturating_add(tx.amount);
                if in_month {
                    monthly_expenses = monthly_expenses.saturating_add(tx.amount);
                    let category = tx.category_id.as_str();
                    match group_index.get(category) {
                        Some(&idx) => groups[idx].1 = groups[idx].1.saturating_add(tx.amount),
                        None => {
                            group_index.insert(category, groups.len());
                            groups.push((category, tx.amount));
                        }
                    }
                }
            }
        }
    }

    let category_breakdown = groups
        .into_iter()
        .map(|(category_id, amount)| {
            let lookup = registry.lookup(category_id);
            CategoryShare {
                category_id: category_id.to_string(),
                label: lookup.label().to_string(),
                amount,
                percentage: percentage_of(amount, monthly_expenses),
                color: lookup.color().to_string(),
                resolved: lookup.is_resolved(),
            }
        })
        .collect();

    Stats {
        total_income,
        total_expenses,
        balance: total_income.saturating_sub(total_expenses),
        monthly_income,
        monthly_expenses,
        category_breakdown,
    }
}

fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    // part <= whole, so the ratio-first fallback cannot overflow
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .unwrap_or_else(|| (part / whole).saturating_mul(Decimal::ONE_HUNDRED))
}
