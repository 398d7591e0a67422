//! Import/export of the full tracker state as a JSON document
//!
//! Import is all-or-nothing: `parse_document` validates the entire document
//! and only a successfully parsed `ImportDocument` is ever applied.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::models::{Settings, SettingsPatch, Transaction};
use crate::store::TransactionStore;

/// Snapshot written by `export`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub transactions: Vec<Transaction>,
    pub settings: Settings,
    #[serde(rename = "exportDate", with = "crate::time::timestamp")]
    pub export_date: DateTime<Utc>,
}

impl ExportDocument {
    /// Pretty-printed JSON, two-space indented
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::SerializationError {
            message: e.to_string(),
        })
    }
}

/// A validated document, ready to be applied
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDocument {
    pub transactions: Vec<Transaction>,
    /// Present when the document carried a settings object
    pub settings: Option<SettingsPatch>,
}

/// Snapshot the current state
pub fn export(store: &TransactionStore, settings: &Settings, now: DateTime<Utc>) -> ExportDocument {
    ExportDocument {
        transactions: store.list().to_vec(),
        settings: settings.clone(),
        export_date: now,
    }
}

/// Suggested file name for an export made on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("expense-data-{}.json", date.format("%Y-%m-%d"))
}

/// Parse and validate an import document. Unknown fields are ignored.
pub fn parse_document(text: &str) -> CoreResult<ImportDocument> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CoreError::validation(format!("document is not valid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| CoreError::validation("document must be a JSON object"))?;

    let entries = match object.get("transactions") {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(CoreError::validation("'transactions' must be an array")),
        None => return Err(CoreError::validation("document has no 'transactions' field")),
    };

    let mut transactions = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let transaction = Transaction::deserialize(entry)
            .map_err(|e| CoreError::validation(format!("transaction #{}: {}", index, e)))?;
        transaction.validate()?;
        transactions.push(transaction);
    }

    let settings = match object.get("settings") {
        None | Some(Value::Null) => None,
        Some(value @ Value::Object(_)) => Some(
            SettingsPatch::deserialize(value)
                .map_err(|e| CoreError::validation(format!("settings: {}", e)))?,
        ),
        Some(_) => return Err(CoreError::validation("'settings' must be an object")),
    };

    Ok(ImportDocument {
        transactions,
        settings,
    })
}

/// Read and validate a document from disk
pub async fn read_document(path: impl AsRef<Path>) -> CoreResult<ImportDocument> {
    let path = path.as_ref();
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CoreError::FileNotFound {
                path: path.display().to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    let document = parse_document(&text)?;
    log::info!(
        "Read import document {} with {} transactions",
        path.display(),
        document.transactions.len()
    );
    Ok(document)
}

/// Write an export document, creating parent directories as needed
pub async fn write_document(path: impl AsRef<Path>, document: &ExportDocument) -> CoreResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, document.to_json_pretty()?).await?;
    log::info!(
        "Exported {} transactions to {}",
        document.transactions.len(),
        path.display()
    );
    Ok(())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{date, dec, draft, now};
    use crate::types::TransactionKind;
    use serde_json::json;

    fn populated() -> (TransactionStore, Settings) {
        let mut store = TransactionStore::new();
        store.add(draft(TransactionKind::Income, "5000", "salary"), now());
        store.add(draft(TransactionKind::Expense, "1200.25", "food"), now());
        let settings = Settings {
            currency_label: "SAR".to_string(),
            hide_amounts: true,
            ..Settings::default()
        };
        (store, settings)
    }

    #[test]
    fn test_export_round_trip() {
        let (store, settings) = populated();
        let text = export(&store, &settings, now()).to_json_pretty().unwrap();
        let document = parse_document(&text).unwrap();

        assert_eq!(document.transactions, store.list());
        let mut restored = Settings::default();
        document.settings.unwrap().apply_to(&mut restored);
        assert_eq!(restored, settings);
    }

    #[test]
    fn test_export_shape() {
        let (store, settings) = populated();
        let value = serde_json::to_value(export(&store, &settings, now())).unwrap();

        assert_eq!(value["exportDate"], "2024-12-15T10:00:00.000Z");
        assert_eq!(value["settings"]["currency"], "SAR");
        assert_eq!(value["transactions"][1]["amount"], 1200.25);
        assert_eq!(value["transactions"][1]["type"], "expense");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(date(2024, 12, 5)), "expense-data-2024-12-05.json");
    }

    #[test]
    fn test_rejects_non_json_and_non_objects() {
        for text in ["not json", "[]", "42", "\"transactions\""] {
            let err = parse_document(text).unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationError, "input {}", text);
        }
    }

    #[test]
    fn test_rejects_missing_or_malformed_transactions() {
        assert!(parse_document(r#"{"settings": {}}"#).is_err());
        assert!(parse_document(r#"{"transactions": {}}"#).is_err());

        let bad_entry = json!({
            "transactions": [
                {"id": "1", "amount": 10, "type": "expense", "category": "food",
                 "date": "2024-12-01", "createdAt": "2024-12-01T00:00:00Z"},
                {"id": "2", "amount": 10, "type": "expense", "category": "food",
                 "date": "not a date", "createdAt": "2024-12-01T00:00:00Z"}
            ]
        });
        let err = parse_document(&bad_entry.to_string()).unwrap_err();
        assert!(err.to_string().contains("transaction #1"), "{}", err);
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        let doc = json!({
            "transactions": [
                {"id": "1", "amount": -5, "type": "expense", "category": "food",
                 "date": "2024-12-01", "createdAt": "2024-12-01T00:00:00Z"}
            ]
        });
        assert!(parse_document(&doc.to_string()).is_err());
    }

    #[test]
    fn test_rejects_malformed_settings() {
        let wrong_type = json!({"transactions": [], "settings": {"darkMode": "yes"}});
        assert!(parse_document(&wrong_type.to_string()).is_err());

        let not_object = json!({"transactions": [], "settings": "USD"});
        assert!(parse_document(&not_object.to_string()).is_err());
    }

    #[test]
    fn test_accepts_empty_and_iso_dates_and_ignores_unknown_fields() {
        let doc = json!({
            "version": 3,
            "transactions": [
                {"id": "1733011200000", "amount": 5000, "type": "income", "category": "salary",
                 "description": "December salary", "date": "2024-12-01T00:00:00.000Z",
                 "createdAt": "2024-12-01T08:00:00.000Z", "tags": ["x"]}
            ],
            "exportDate": "2024-12-10T00:00:00.000Z"
        });
        let document = parse_document(&doc.to_string()).unwrap();
        assert_eq!(document.transactions.len(), 1);
        assert_eq!(document.transactions[0].occurred_at, date(2024, 12, 1));
        assert_eq!(document.transactions[0].amount, dec("5000"));
        assert!(document.settings.is_none());

        let empty = parse_document(r#"{"transactions": []}"#).unwrap();
        assert!(empty.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backups").join(export_file_name(date(2024, 12, 15)));
        let (store, settings) = populated();

        write_document(&path, &export(&store, &settings, now())).await.unwrap();
        let document = read_document(&path).await.unwrap();
        assert_eq!(document.transactions, store.list());
    }

    #[tokio::test]
    async fn test_read_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(dir.path().join("nope.json")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileNotFound);
    }
}
