//! Core data models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::TransactionKind;

/// A recorded money movement.
///
/// Wire names follow the persisted/exported document format
/// (`type`, `category`, `date`, `createdAt`); the long names are accepted
/// as aliases when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, fixed at creation
    pub id: String,
    /// Positive amount; direction comes from `kind`
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type", alias = "kind")]
    pub kind: TransactionKind,
    /// Category id; may not resolve in the registry after an import
    #[serde(rename = "category", alias = "categoryId")]
    pub category_id: String,
    #[serde(default)]
    pub description: String,
    /// Calendar date the movement happened on
    #[serde(rename = "date", alias = "occurredAt", with = "crate::time::calendar_date")]
    pub occurred_at: NaiveDate,
    /// When the record was created
    #[serde(rename = "createdAt", alias = "recordedAt", with = "crate::time::timestamp")]
    pub recorded_at: DateTime<Utc>,
}

impl Transaction {
    /// Build a record from a draft and the identity assigned by the store
    pub fn from_draft(draft: TransactionDraft, id: String, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            amount: draft.amount,
            kind: draft.kind,
            category_id: draft.category_id,
            description: draft.description,
            occurred_at: draft.occurred_at,
            recorded_at,
        }
    }

    /// Amount with the direction applied (negative for expenses)
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    /// Check the record invariants that the type system does not enforce
    pub fn validate(&self) -> CoreResult<()> {
        if self.id.trim().is_empty() {
            return Err(CoreError::validation("transaction id must not be empty"));
        }
        validate_amount(self.amount)
            .map_err(|e| CoreError::validation(format!("transaction {}: {}", self.id, e)))
    }
}

/// A transaction before the store assigns `id` and `recorded_at`
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category_id: String,
    pub description: String,
    pub occurred_at: NaiveDate,
}

impl TransactionDraft {
    /// Create a draft, rejecting non-positive amounts and blank categories
    pub fn new(
        amount: Decimal,
        kind: TransactionKind,
        category_id: impl Into<String>,
        description: impl Into<String>,
        occurred_at: NaiveDate,
    ) -> CoreResult<Self> {
        validate_amount(amount).map_err(CoreError::validation)?;

        let category_id = category_id.into();
        if category_id.trim().is_empty() {
            return Err(CoreError::validation("category must not be empty"));
        }

        Ok(Self {
            amount,
            kind,
            category_id,
            description: description.into(),
            occurred_at,
        })
    }
}

/// Most decimal places an amount may carry
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// Largest accepted amount. Amounts are written as JSON numbers, and up to
/// this size with two decimals they survive the trip through `f64`
/// unchanged. It also keeps every sum far from `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

fn validate_amount(amount: Decimal) -> Result<(), String> {
    if amount <= Decimal::ZERO {
        return Err(format!("amount must be greater than zero, got {}", amount));
    }
    if amount > MAX_AMOUNT {
        return Err(format!("amount must not exceed {}, got {}", MAX_AMOUNT, amount));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(format!(
            "amount must have at most {} decimal places, got {}",
            MAX_AMOUNT_SCALE, amount
        ));
    }
    Ok(())
}

/// User preferences. They only affect formatting, never aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Currency code used as a display label
    #[serde(rename = "currency", alias = "currencyLabel")]
    pub currency_label: String,
    #[serde(rename = "darkMode")]
    pub dark_mode: bool,
    #[serde(rename = "hideAmounts")]
    pub hide_amounts: bool,
    #[serde(rename = "language", alias = "locale")]
    pub locale: String,
    #[serde(rename = "budgetAlerts", alias = "budgetAlertsEnabled")]
    pub budget_alerts_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency_label: "USD".to_string(),
            dark_mode: false,
            hide_amounts: false,
            locale: "ar".to_string(),
            budget_alerts_enabled: true,
        }
    }
}

/// Partial settings for merge-patch updates. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(rename = "currency", alias = "currencyLabel", skip_serializing_if = "Option::is_none")]
    pub currency_label: Option<String>,
    #[serde(rename = "darkMode", skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(rename = "hideAmounts", skip_serializing_if = "Option::is_none")]
    pub hide_amounts: Option<bool>,
    #[serde(rename = "language", alias = "locale", skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(rename = "budgetAlerts", alias = "budgetAlertsEnabled", skip_serializing_if = "Option::is_none")]
    pub budget_alerts_enabled: Option<bool>,
}

impl SettingsPatch {
    /// Check if the patch carries no fields
    pub fn is_empty(&self) -> bool {
        self == &SettingsPatch::default()
    }

    /// Shallow-merge the provided fields into `settings`
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(ref currency) = self.currency_label {
            settings.currency_label = currency.clone();
        }
        if let Some(dark_mode) = self.dark_mode {
            settings.dark_mode = dark_mode;
        }
        if let Some(hide_amounts) = self.hide_amounts {
            settings.hide_amounts = hide_amounts;
        }
        if let Some(ref locale) = self.locale {
            settings.locale = locale.clone();
        }
        if let Some(alerts) = self.budget_alerts_enabled {
            settings.budget_alerts_enabled = alerts;
        }
    }
}

impl From<Settings> for SettingsPatch {
    fn from(settings: Settings) -> Self {
        Self {
            currency_label: Some(settings.currency_label),
            dark_mode: Some(settings.dark_mode),
            hide_amounts: Some(settings.hide_amounts),
            locale: Some(settings.locale),
            budget_alerts_enabled: Some(settings.budget_alerts_enabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dec;
    use chrono::TimeZone;

    fn sample() -> Transaction {
        Transaction {
            id: "1733050800000".to_string(),
            amount: dec("1200.5"),
            kind: TransactionKind::Expense,
            category_id: "food".to_string(),
            description: "Groceries".to_string(),
            occurred_at: NaiveDate::from_ymd_opt(2024, 12, 2).unwrap(),
            recorded_at: Utc.with_ymd_and_hms(2024, 12, 2, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_transaction_wire_format() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["id"], "1733050800000");
        assert_eq!(value["amount"], 1200.5);
        assert_eq!(value["type"], "expense");
        assert_eq!(value["category"], "food");
        assert_eq!(value["date"], "2024-12-02");
        assert_eq!(value["createdAt"], "2024-12-02T09:30:00.000Z");
    }

    #[test]
    fn test_transaction_reads_aliases_and_timestamps() {
        let json = serde_json::json!({
            "id": "a",
            "amount": 300,
            "kind": "income",
            "categoryId": "salary",
            "occurredAt": "2024-12-01T00:00:00.000Z",
            "recordedAt": "2024-12-01T08:15:00Z",
            "extra": "ignored"
        });
        let tx: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::Income);
        assert_eq!(tx.category_id, "salary");
        assert_eq!(tx.description, "");
        assert_eq!(tx.occurred_at, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(tx.amount, dec("300"));
    }

    #[test]
    fn test_signed_amount() {
        let mut tx = sample();
        assert_eq!(tx.signed_amount(), dec("-1200.5"));
        tx.kind = TransactionKind::Income;
        assert_eq!(tx.signed_amount(), dec("1200.5"));
    }

    #[test]
    fn test_transaction_validate() {
        let mut tx = sample();
        assert!(tx.validate().is_ok());
        tx.amount = Decimal::ZERO;
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_draft_rejects_bad_input() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
        assert!(TransactionDraft::new(dec("-5"), TransactionKind::Expense, "food", "", date).is_err());
        assert!(TransactionDraft::new(dec("5"), TransactionKind::Expense, "  ", "", date).is_err());
        assert!(TransactionDraft::new(dec("5"), TransactionKind::Expense, "food", "", date).is_ok());
    }

    #[test]
    fn test_amount_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
        let new = |raw: &str| TransactionDraft::new(dec(raw), TransactionKind::Income, "gift", "", date);

        assert_eq!(MAX_AMOUNT, dec("999999999999.99"));
        assert!(new("999999999999.99").is_ok());
        assert!(new("0.01").is_ok());
        assert!(new("12.500").is_ok());
        assert!(new("1000000000000").is_err());
        assert!(new("50000000000000000000000000000").is_err());
        assert!(new("0.123456789012345678").is_err());
        assert!(new("12345678901234567.89").is_err());

        let mut tx = sample();
        tx.amount = dec("10.001");
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_bounded_amounts_survive_json() {
        for raw in ["999999999999.99", "0.01", "1234567.89", "33.33"] {
            let mut tx = sample();
            tx.amount = dec(raw);
            let text = serde_json::to_string(&tx).unwrap();
            let back: Transaction = serde_json::from_str(&text).unwrap();
            assert_eq!(back, tx, "amount {}", raw);
        }
    }

    #[test]
    fn test_settings_defaults_for_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"currency":"SAR"}"#).unwrap();
        assert_eq!(settings.currency_label, "SAR");
        assert_eq!(settings.locale, "ar");
        assert!(settings.budget_alerts_enabled);
        assert!(!settings.hide_amounts);
    }

    #[test]
    fn test_settings_patch_merges_shallowly() {
        let mut settings = Settings::default();
        let patch = SettingsPatch {
            hide_amounts: Some(true),
            locale: Some("en".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut settings);

        assert!(settings.hide_amounts);
        assert_eq!(settings.locale, "en");
        assert_eq!(settings.currency_label, "USD");
        assert!(!SettingsPatch::from(settings).is_empty());
        assert!(SettingsPatch::default().is_empty());
    }
}
