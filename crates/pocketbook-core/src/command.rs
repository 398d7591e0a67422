//! Command processor
//!
//! `Tracker` owns the transaction store, the settings and the latest stats
//! snapshot. Every state change goes through `Tracker::apply`, which mutates
//! in memory, recomputes the stats when the transaction set changed, and
//! returns the persistence effects the host has to carry out. The tracker
//! itself never touches storage.

use chrono::{DateTime, NaiveDate, Utc};

use crate::category::CategoryRegistry;
use crate::models::{Settings, SettingsPatch, Transaction, TransactionDraft};
use crate::settings::SettingsStore;
use crate::stats::{compute_stats, Stats};
use crate::store::TransactionStore;

/// A state change request
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTransaction(TransactionDraft),
    /// Full replace of the record with the same id
    UpdateTransaction(Transaction),
    DeleteTransaction(String),
    /// Swap the whole transaction set (import)
    ReplaceTransactions(Vec<Transaction>),
    UpdateSettings(SettingsPatch),
    /// Rebuild the stats snapshot without touching data, e.g. after the
    /// month rolled over
    RecalculateStats,
}

impl Command {
    pub const ADD_TRANSACTION: &'static str = "add_transaction";

    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTransaction(_) => Self::ADD_TRANSACTION,
            Command::UpdateTransaction(_) => "update_transaction",
            Command::DeleteTransaction(_) => "delete_transaction",
            Command::ReplaceTransactions(_) => "replace_transactions",
            Command::UpdateSettings(_) => "update_settings",
            Command::RecalculateStats => "recalculate_stats",
        }
    }
}

/// Persistence side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Write the full transaction list
    PersistTransactions,
    /// Write the full settings object
    PersistSettings,
}

/// What a command did
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Added(Transaction),
    Updated { id: String },
    Deleted { id: String },
    Replaced { count: usize },
    /// `changed` is false when the patch matched the current values
    SettingsUpdated { changed: bool },
    /// Update or delete of an id that is not in the store
    Ignored { id: String },
    Recalculated,
}

/// Result of applying one command
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub outcome: MutationOutcome,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(outcome: MutationOutcome, effects: Vec<Effect>) -> Self {
        Self { outcome, effects }
    }

    fn quiet(outcome: MutationOutcome) -> Self {
        Self::new(outcome, Vec::new())
    }
}

/// In-memory state of the tracker
#[derive(Debug, Clone)]
pub struct Tracker {
    store: TransactionStore,
    settings: SettingsStore,
    registry: CategoryRegistry,
    stats: Stats,
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            store: TransactionStore::new(),
            settings: SettingsStore::default(),
            registry: CategoryRegistry::builtin(),
            stats: Stats::default(),
        }
    }
}

impl Tracker {
    /// Tracker over existing state with stats computed for `today`
    pub fn new(transactions: Vec<Transaction>, settings: Settings, today: NaiveDate) -> Self {
        let mut tracker = Self {
            store: TransactionStore::with_records(transactions),
            settings: SettingsStore::new(settings),
            registry: CategoryRegistry::builtin(),
            stats: Stats::default(),
        };
        tracker.recompute(today);
        tracker
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.store.list()
    }

    pub fn settings(&self) -> &Settings {
        self.settings.current()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Typed form of `Command::AddTransaction`, returning the stored record
    pub fn add(
        &mut self,
        draft: TransactionDraft,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> (Transaction, Vec<Effect>) {
        log::debug!("Applying command: {}", Command::ADD_TRANSACTION);
        self.insert(draft, now, today)
    }

    /// Apply one command. Never fails: unknown ids are reported as
    /// `Ignored` and request no writes.
    pub fn apply(&mut self, command: Command, now: DateTime<Utc>, today: NaiveDate) -> Transition {
        log::debug!("Applying command: {}", command.name());

        let transition = match command {
            Command::AddTransaction(draft) => {
                let (added, effects) = self.insert(draft, now, today);
                Transition::new(MutationOutcome::Added(added), effects)
            }
            Command::UpdateTransaction(transaction) => {
                let id = transaction.id.clone();
                if self.store.update(transaction) {
                    self.recompute(today);
                    Transition::new(MutationOutcome::Updated { id }, vec![Effect::PersistTransactions])
                } else {
                    Transition::quiet(MutationOutcome::Ignored { id })
                }
            }
            Command::DeleteTransaction(id) => {
                if self.store.delete(&id) {
                    self.recompute(today);
                    Transition::new(MutationOutcome::Deleted { id }, vec![Effect::PersistTransactions])
                } else {
                    Transition::quiet(MutationOutcome::Ignored { id })
                }
            }
            Command::ReplaceTransactions(records) => {
                let count = records.len();
                self.store.replace_all(records);
                self.recompute(today);
                Transition::new(MutationOutcome::Replaced { count }, vec![Effect::PersistTransactions])
            }
            Command::UpdateSettings(patch) => {
                let changed = self.settings.update(&patch);
                let effects = if changed { vec![Effect::PersistSettings] } else { Vec::new() };
                Transition::new(MutationOutcome::SettingsUpdated { changed }, effects)
            }
            Command::RecalculateStats => {
                self.recompute(today);
                Transition::quiet(MutationOutcome::Recalculated)
            }
        };

        if let MutationOutcome::Ignored { ref id } = transition.outcome {
            log::debug!("No transaction with id {}, command ignored", id);
        }
        transition
    }

    fn insert(&mut self, draft: TransactionDraft, now: DateTime<Utc>, today: NaiveDate) -> (Transaction, Vec<Effect>) {
        let added = self.store.add(draft, now);
        self.recompute(today);
        (added, vec![Effect::PersistTransactions])
    }

    fn recompute(&mut self, today: NaiveDate) {
        self.stats = compute_stats(self.store.list(), &self.registry, today);
    }
}
