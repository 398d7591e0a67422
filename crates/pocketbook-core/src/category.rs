//! Built-in category catalog
//!
//! Two disjoint, immutable catalogs: expense categories and income
//! categories. Transactions reference them by id; ids that do not resolve
//! (for example after importing a foreign document) fall back to a neutral
//! label and color instead of failing.

use serde::Serialize;

use crate::types::TransactionKind;

/// Color used for categories that are not in the catalog
pub const FALLBACK_COLOR: &str = "#8884d8";

/// Static category metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    /// English display name
    pub name: &'static str,
    /// Arabic display name
    pub name_ar: &'static str,
    /// Icon identifier for the presentation layer
    pub icon: &'static str,
    pub color: &'static str,
    pub kind: TransactionKind,
}

impl Category {
    /// Display name for a locale; anything but Arabic gets English
    pub fn display_name(&self, locale: &str) -> &'static str {
        if locale.to_lowercase().starts_with("ar") {
            self.name_ar
        } else {
            self.name
        }
    }
}

const fn expense(
    id: &'static str,
    name: &'static str,
    name_ar: &'static str,
    icon: &'static str,
    color: &'static str,
) -> Category {
    Category {
        id,
        name,
        name_ar,
        icon,
        color,
        kind: TransactionKind::Expense,
    }
}

const fn income(
    id: &'static str,
    name: &'static str,
    name_ar: &'static str,
    icon: &'static str,
    color: &'static str,
) -> Category {
    Category {
        id,
        name,
        name_ar,
        icon,
        color,
        kind: TransactionKind::Income,
    }
}

pub const EXPENSE_CATEGORIES: [Category; 8] = [
    expense("food", "Food & Drinks", "طعام وشراب", "UtensilsCrossed", "#FF6B6B"),
    expense("transport", "Transport", "مواصلات", "Car", "#4ECDC4"),
    expense("shopping", "Shopping", "تسوق", "ShoppingBag", "#45B7D1"),
    expense("bills", "Bills", "فواتير", "Zap", "#F7DC6F"),
    expense("health", "Health", "صحة", "Heart", "#BB8FCE"),
    expense("entertainment", "Entertainment", "ترفيه", "Film", "#85C1E9"),
    expense("education", "Education", "تعليم", "GraduationCap", "#82E0AA"),
    expense("other", "Other", "أخرى", "MoreHorizontal", "#D5A6BD"),
];

pub const INCOME_CATEGORIES: [Category; 6] = [
    income("salary", "Salary", "راتب", "Briefcase", "#27AE60"),
    income("business", "Business", "أعمال", "Building2", "#2ECC71"),
    income("freelance", "Freelance", "عمل حر", "Laptop", "#58D68D"),
    income("investment", "Investment", "استثمار", "TrendingUp", "#85C1E9"),
    income("gift", "Gift", "هدية", "Gift", "#F8C471"),
    income("other-income", "Other", "أخرى", "DollarSign", "#AED6F1"),
];

/// Result of resolving a category id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryLookup<'a> {
    /// The id is in the catalog
    Resolved(&'a Category),
    /// Unknown id; the raw id stands in as the label
    Fallback { id: &'a str },
}

impl<'a> CategoryLookup<'a> {
    pub fn label(&self) -> &'a str {
        match self {
            CategoryLookup::Resolved(category) => category.name,
            CategoryLookup::Fallback { id } => id,
        }
    }

    pub fn color(&self) -> &'a str {
        match self {
            CategoryLookup::Resolved(category) => category.color,
            CategoryLookup::Fallback { .. } => FALLBACK_COLOR,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CategoryLookup::Resolved(_))
    }
}

/// Read-only view over the expense and income catalogs
#[derive(Debug, Clone, Copy)]
pub struct CategoryRegistry {
    expense: &'static [Category],
    income: &'static [Category],
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryRegistry {
    /// The built-in catalogs
    pub const fn builtin() -> Self {
        Self {
            expense: &EXPENSE_CATEGORIES,
            income: &INCOME_CATEGORIES,
        }
    }

    pub fn expense_categories(&self) -> &'static [Category] {
        self.expense
    }

    pub fn income_categories(&self) -> &'static [Category] {
        self.income
    }

    /// Categories offered for a transaction kind
    pub fn for_kind(&self, kind: TransactionKind) -> &'static [Category] {
        match kind {
            TransactionKind::Expense => self.expense,
            TransactionKind::Income => self.income,
        }
    }

    /// All categories, expense catalog first
    pub fn all(&self) -> impl Iterator<Item = &'static Category> {
        self.expense.iter().chain(self.income.iter())
    }

    /// Find a category by id
    pub fn get(&self, id: &str) -> Option<&'static Category> {
        self.all().find(|c| c.id == id)
    }

    /// Resolve an id, never failing
    pub fn lookup<'a>(&self, id: &'a str) -> CategoryLookup<'a> {
        match self.get(id) {
            Some(category) => CategoryLookup::Resolved(category),
            None => CategoryLookup::Fallback { id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalogs_are_disjoint() {
        let registry = CategoryRegistry::builtin();
        let expense: HashSet<_> = registry.expense_categories().iter().map(|c| c.id).collect();
        let income: HashSet<_> = registry.income_categories().iter().map(|c| c.id).collect();
        assert!(expense.is_disjoint(&income));
        assert_eq!(registry.all().count(), 14);
    }

    #[test]
    fn test_catalog_kinds_match() {
        let registry = CategoryRegistry::builtin();
        assert!(registry
            .for_kind(TransactionKind::Expense)
            .iter()
            .all(|c| c.kind == TransactionKind::Expense));
        assert!(registry
            .for_kind(TransactionKind::Income)
            .iter()
            .all(|c| c.kind == TransactionKind::Income));
    }

    #[test]
    fn test_lookup_resolved() {
        let registry = CategoryRegistry::builtin();
        let lookup = registry.lookup("food");
        assert!(lookup.is_resolved());
        assert_eq!(lookup.label(), "Food & Drinks");
        assert_eq!(lookup.color(), "#FF6B6B");
    }

    #[test]
    fn test_lookup_fallback() {
        let registry = CategoryRegistry::builtin();
        let lookup = registry.lookup("crypto");
        assert_eq!(lookup, CategoryLookup::Fallback { id: "crypto" });
        assert_eq!(lookup.label(), "crypto");
        assert_eq!(lookup.color(), FALLBACK_COLOR);
    }

    #[test]
    fn test_display_name_by_locale() {
        let salary = CategoryRegistry::builtin().get("salary").unwrap();
        assert_eq!(salary.display_name("ar"), "راتب");
        assert_eq!(salary.display_name("ar-SA"), "راتب");
        assert_eq!(salary.display_name("en"), "Salary");
    }
}
