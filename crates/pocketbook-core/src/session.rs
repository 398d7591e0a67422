//! Session: the host-facing object
//!
//! A session hydrates the tracker from storage, routes every operation
//! through `Tracker::apply`, and carries out the persistence effects of
//! each transition (write-through). Storage failures never undo an
//! in-memory change; they come back as `Durability::Degraded`.

use crate::command::{Command, Effect, MutationOutcome, Tracker};
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::exchange::{self, ExportDocument, ImportDocument};
use crate::models::{Settings, SettingsPatch, Transaction, TransactionDraft};
use crate::query::TransactionQuery;
use crate::sample::sample_drafts;
use crate::stats::Stats;
use crate::storage::{hydrate, Durability, Persister, QueuedPersister, StorageKeys, WriteRequest};
use crate::time::Clock;

/// Result of a state change together with how durable it is
#[derive(Debug, Clone, PartialEq)]
pub struct Commit<T> {
    pub value: T,
    pub durability: Durability,
}

impl<T> Commit<T> {
    fn new(value: T, durability: Durability) -> Self {
        Self { value, durability }
    }
}

pub struct Session<P: Persister> {
    tracker: Tracker,
    persister: P,
    keys: StorageKeys,
    clock: Box<dyn Clock>,
    logger: DefaultErrorLogger,
    warnings: Vec<CoreError>,
}

impl<P: Persister> Session<P> {
    /// Hydrate from `persister`. Unreadable records fall back to empty or
    /// default state; the problems are logged and kept in `warnings()`.
    pub fn open(persister: P, keys: StorageKeys, clock: Box<dyn Clock>) -> Self {
        let hydrated = hydrate(&persister, &keys);
        let logger = DefaultErrorLogger;
        for warning in &hydrated.warnings {
            logger.log_error(warning, &ErrorContext::new("hydrate"));
        }
        log::info!(
            "Loaded {} transactions (currency {})",
            hydrated.transactions.len(),
            hydrated.settings.currency_label
        );

        let tracker = Tracker::new(hydrated.transactions, hydrated.settings, clock.today());
        Self {
            tracker,
            persister,
            keys,
            clock,
            logger,
            warnings: hydrated.warnings,
        }
    }

    // ==================== Queries ====================

    pub fn transactions(&self) -> &[Transaction] {
        self.tracker.transactions()
    }

    pub fn stats(&self) -> &Stats {
        self.tracker.stats()
    }

    pub fn settings(&self) -> &Settings {
        self.tracker.settings()
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn persister(&self) -> &P {
        &self.persister
    }

    /// Problems found while hydrating
    pub fn warnings(&self) -> &[CoreError] {
        &self.warnings
    }

    /// Filtered, newest-first listing
    pub fn query(&self, query: &TransactionQuery) -> Vec<&Transaction> {
        query.run(self.tracker.transactions())
    }

    // ==================== Mutations ====================

    pub fn add(&mut self, draft: TransactionDraft) -> Commit<Transaction> {
        let (transaction, effects) = self.tracker.add(draft, self.clock.now(), self.clock.today());
        let durability = self.run_effects(Command::ADD_TRANSACTION, &effects, &transaction.id);
        Commit::new(transaction, durability)
    }

    /// Full replace by id; `false` when the id is unknown
    pub fn update(&mut self, transaction: Transaction) -> Commit<bool> {
        let (outcome, durability) = self.execute(Command::UpdateTransaction(transaction));
        Commit::new(matches!(outcome, MutationOutcome::Updated { .. }), durability)
    }

    /// `false` when the id is unknown
    pub fn delete(&mut self, id: &str) -> Commit<bool> {
        let (outcome, durability) = self.execute(Command::DeleteTransaction(id.to_string()));
        Commit::new(matches!(outcome, MutationOutcome::Deleted { .. }), durability)
    }

    pub fn replace_all(&mut self, transactions: Vec<Transaction>) -> Commit<usize> {
        let count = transactions.len();
        let (_, durability) = self.execute(Command::ReplaceTransactions(transactions));
        Commit::new(count, durability)
    }

    /// Merge `patch` into the settings; the value is whether anything changed
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Commit<bool> {
        let (outcome, durability) = self.execute(Command::UpdateSettings(patch));
        let changed = matches!(outcome, MutationOutcome::SettingsUpdated { changed: true });
        Commit::new(changed, durability)
    }

    /// Recompute stats against the clock's current day
    pub fn refresh_stats(&mut self) -> &Stats {
        self.execute(Command::RecalculateStats);
        self.tracker.stats()
    }

    /// Add the demo transactions, dated in the current month
    pub fn load_samples(&mut self) -> Commit<Vec<Transaction>> {
        let mut added = Vec::new();
        let mut durability = Durability::Persisted;
        for draft in sample_drafts(self.clock.today()) {
            let commit = self.add(draft);
            added.push(commit.value);
            durability = durability.and(commit.durability);
        }
        Commit::new(added, durability)
    }

    // ==================== Import / Export ====================

    pub fn export(&self) -> ExportDocument {
        exchange::export(self.tracker.store(), self.tracker.settings(), self.clock.now())
    }

    /// Apply a validated document: replace the transactions, then merge the
    /// settings when the document carried them
    pub fn import(&mut self, document: ImportDocument) -> Commit<usize> {
        let commit = self.replace_all(document.transactions);
        let mut durability = commit.durability;
        if let Some(patch) = document.settings {
            durability = durability.and(self.update_settings(patch).durability);
        }
        log::info!("Imported {} transactions", commit.value);
        Commit::new(commit.value, durability)
    }

    /// Parse, validate and apply a document. Nothing changes on error.
    pub fn import_text(&mut self, text: &str) -> CoreResult<Commit<usize>> {
        let document = exchange::parse_document(text)?;
        Ok(self.import(document))
    }

    // ==================== Internals ====================

    fn execute(&mut self, command: Command) -> (MutationOutcome, Durability) {
        let name = command.name();
        let transition = self
            .tracker
            .apply(command, self.clock.now(), self.clock.today());

        let durability = self.run_effects(name, &transition.effects, &transition.outcome);
        (transition.outcome, durability)
    }

    fn run_effects(&self, name: &str, effects: &[Effect], outcome: &dyn std::fmt::Debug) -> Durability {
        let mut durability = Durability::Persisted;
        for effect in effects {
            durability = durability.and(self.run_effect(*effect));
        }

        if let Durability::Degraded(ref errors) = durability {
            let context = ErrorContext::new(name).with_data("outcome", serde_json::json!(format!("{:?}", outcome)));
            for error in errors {
                self.logger.log_error(error, &context);
            }
        }
        durability
    }

    fn run_effect(&self, effect: Effect) -> Durability {
        let request = match effect {
            Effect::PersistTransactions => {
                WriteRequest::transactions(&self.keys.transactions, self.tracker.transactions())
            }
            Effect::PersistSettings => WriteRequest::settings(&self.keys.settings, self.tracker.settings()),
        };
        match request {
            Ok(request) => self.persister.persist(request),
            Err(e) => Durability::Degraded(vec![e]),
        }
    }
}

impl Session<QueuedPersister> {
    /// Wait for every queued write issued so far
    pub async fn flush(&self) -> Durability {
        self.persister.flush().await
    }

    /// Drain the queue and stop its writer
    pub async fn close(self) -> Durability {
        self.persister.shutdown().await
    }
}

// ==================== Tests ====================
