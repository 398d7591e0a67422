//! Core state and aggregation engine for pocketbook
//!
//! Transactions live in a `TransactionStore`; every change goes through the
//! `Tracker` command processor, which recomputes the derived `Stats` and
//! reports the persistence effects a `Session` then carries out.

pub mod category;
pub mod command;
pub mod currency;
pub mod error;
pub mod exchange;
pub mod models;
pub mod query;
pub mod sample;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod store;
pub mod time;
pub mod types;

pub use category::{Category, CategoryLookup, CategoryRegistry, FALLBACK_COLOR};
pub use command::{Command, Effect, MutationOutcome, Tracker, Transition};
pub use currency::{find_currency, format_amount, format_signed_amount, Currency, CURRENCIES};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorLogger, ErrorSeverity};
pub use exchange::{export_file_name, parse_document, ExportDocument, ImportDocument};
pub use models::{Settings, SettingsPatch, Transaction, TransactionDraft, MAX_AMOUNT, MAX_AMOUNT_SCALE};
pub use query::TransactionQuery;
pub use session::{Commit, Session};
pub use stats::{compute_stats, CategoryShare, Stats};
pub use storage::{
    DirectPersister, Durability, FileStore, KeyValueStore, MemoryStore, Persister, QueuedPersister,
    StorageKeys, WriteQueue,
};
pub use store::TransactionStore;
pub use time::{Clock, FixedClock, MonthWindow, SystemClock};
pub use types::{SymbolPosition, TransactionKind};

/// Shared fixtures for unit tests. "Now" is pinned to mid-December 2024.
#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::models::TransactionDraft;
    use crate::types::TransactionKind;

    pub fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 15, 10, 0, 0).unwrap()
    }

    pub fn today() -> NaiveDate {
        now().date_naive()
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Draft dated today
    pub fn draft(kind: TransactionKind, amount: &str, category: &str) -> TransactionDraft {
        draft_on(kind, amount, category, today())
    }

    pub fn draft_on(kind: TransactionKind, amount: &str, category: &str, on: NaiveDate) -> TransactionDraft {
        TransactionDraft::new(dec(amount), kind, category, "", on).unwrap()
    }
}
