//! Pocketbook main entry point

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pocketbook_config::Config;
use pocketbook_core::exchange::{export_file_name, read_document, write_document};
use pocketbook_core::{
    find_currency, format_amount, format_signed_amount, CategoryRegistry, Clock, DirectPersister,
    Durability, FileStore, KeyValueStore, MonthWindow, Persister, QueuedPersister, Session,
    SettingsPatch, StorageKeys, SystemClock, TransactionDraft, TransactionKind, TransactionQuery,
};
use pocketbook_utils::truncate_chars;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "pocketbook")]
#[command(version = "0.1.0")]
#[command(about = "Track income and expenses and see where the month went", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Record a new transaction
    Add {
        /// income or expense
        #[arg(short, long)]
        kind: TransactionKind,
        /// Positive, at most two decimal places
        #[arg(short, long)]
        amount: Decimal,
        /// Category id, see `pocketbook categories`
        #[arg(short = 'g', long)]
        category: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Change fields of an existing transaction
    Update {
        id: String,
        #[arg(short, long)]
        kind: Option<TransactionKind>,
        #[arg(short, long)]
        amount: Option<Decimal>,
        #[arg(short = 'g', long)]
        category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Remove a transaction
    Delete { id: String },
    /// Show recent transactions, newest first
    List {
        #[arg(short, long)]
        kind: Option<TransactionKind>,
        #[arg(short = 'g', long)]
        category: Option<String>,
        /// Defaults to display.recent_limit
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show totals, this month's figures and the category breakdown
    Stats,
    /// List the built-in categories
    Categories {
        #[arg(short, long)]
        kind: Option<TransactionKind>,
    },
    /// Show or change preferences
    Settings {
        #[command(subcommand)]
        action: SettingsCmd,
    },
    /// Write all data to a JSON document
    Export {
        /// Defaults to expense-data-YYYY-MM-DD.json
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all data with the contents of a JSON document
    Import { path: PathBuf },
    /// Add demo transactions for the current month
    Sample,
    /// Print the default configuration
    InitConfig,
}

#[derive(Subcommand, Debug)]
enum SettingsCmd {
    Show,
    Set {
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        dark_mode: Option<bool>,
        #[arg(long)]
        hide_amounts: Option<bool>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        budget_alerts: Option<bool>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Cmd::InitConfig = args.command {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = match Config::load_or_default(&args.config).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            if let Some(hint) = e.hint() {
                eprintln!("hint: {}", hint);
            }
            return Err(e)
                .with_context(|| format!("failed to load configuration from {}", args.config.display()));
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.clone()),
    )
    .init();

    log::debug!(
        "Data directory {}, transactions at {}",
        config.data.path.display(),
        config.record_path(&config.data.transactions_key).display()
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.data.path));
        let keys = StorageKeys::from_config(&config.data);

        if config.data.queued_writes {
            let mut session = Session::open(QueuedPersister::spawn(store), keys, Box::new(SystemClock));
            let result = run(&mut session, args.command, &config).await;
            report_durability(&session.close().await);
            result
        } else {
            let mut session = Session::open(DirectPersister::new(store), keys, Box::new(SystemClock));
            run(&mut session, args.command, &config).await
        }
    })
}

async fn run<P: Persister>(session: &mut Session<P>, command: Cmd, config: &Config) -> anyhow::Result<()> {
    for warning in session.warnings() {
        eprintln!("warning: {}", warning);
    }

    match command {
        Cmd::Add {
            kind,
            amount,
            category,
            description,
            date,
        } => {
            let date = date.unwrap_or_else(|| SystemClock.today());
            let draft = TransactionDraft::new(amount, kind, category, description, date)?;
            let commit = session.add(draft);
            println!("Added {} ({})", commit.value.id, format_amount(commit.value.amount, session.settings()));
            report_durability(&commit.durability);
        }
        Cmd::Update {
            id,
            kind,
            amount,
            category,
            description,
            date,
        } => {
            let Some(mut transaction) = session.tracker().store().get(&id).cloned() else {
                println!("No transaction with id {}", id);
                return Ok(());
            };
            if let Some(kind) = kind {
                transaction.kind = kind;
            }
            if let Some(amount) = amount {
                transaction.amount = amount;
            }
            if let Some(category) = category {
                transaction.category_id = category;
            }
            if let Some(description) = description {
                transaction.description = description;
            }
            if let Some(date) = date {
                transaction.occurred_at = date;
            }
            transaction.validate()?;

            let commit = session.update(transaction);
            println!("Updated {}", id);
            report_durability(&commit.durability);
        }
        Cmd::Delete { id } => {
            let commit = session.delete(&id);
            if commit.value {
                println!("Deleted {}", id);
            } else {
                println!("No transaction with id {}", id);
            }
            report_durability(&commit.durability);
        }
        Cmd::List { kind, category, limit } => {
            let mut query = TransactionQuery::new().limit(limit.unwrap_or(config.display.recent_limit));
            if let Some(kind) = kind {
                query = query.kind(kind);
            }
            if let Some(category) = category {
                query = query.category(category);
            }
            print_transactions(session, &query);
        }
        Cmd::Stats => print_stats(session, config),
        Cmd::Categories { kind } => print_categories(kind, &session.settings().locale),
        Cmd::Settings { action } => match action {
            SettingsCmd::Show => {
                println!("{}", serde_json::to_string_pretty(session.settings())?);
            }
            SettingsCmd::Set {
                currency,
                dark_mode,
                hide_amounts,
                language,
                budget_alerts,
            } => {
                let patch = SettingsPatch {
                    currency_label: currency,
                    dark_mode,
                    hide_amounts,
                    locale: language,
                    budget_alerts_enabled: budget_alerts,
                };
                if patch.is_empty() {
                    bail!("nothing to change, pass at least one setting");
                }
                if let Some(ref code) = patch.currency_label {
                    if find_currency(code).is_none() {
                        eprintln!("note: {} is not a known currency, amounts will show it as a plain label", code);
                    }
                }
                let commit = session.update_settings(patch);
                println!("{}", if commit.value { "Settings updated" } else { "Settings unchanged" });
                report_durability(&commit.durability);
            }
        },
        Cmd::Export { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(SystemClock.today())));
            let document = session.export();
            write_document(&path, &document).await?;
            println!("Exported {} transactions to {}", document.transactions.len(), path.display());
        }
        Cmd::Import { path } => {
            let document = read_document(&path)
                .await
                .with_context(|| format!("import of {} rejected", path.display()))?;
            let commit = session.import(document);
            println!("Imported {} transactions", commit.value);
            report_durability(&commit.durability);
        }
        Cmd::Sample => {
            let commit = session.load_samples();
            println!("Added {} sample transactions", commit.value.len());
            report_durability(&commit.durability);
        }
        Cmd::InitConfig => print!("{}", Config::generate_default()),
    }

    Ok(())
}

fn print_transactions<P: Persister>(session: &Session<P>, query: &TransactionQuery) {
    let settings = session.settings();
    let registry = session.tracker().registry();
    let rows = session.query(query);
    if rows.is_empty() {
        println!("No transactions");
        return;
    }
    for tx in rows {
        let category = registry
            .get(&tx.category_id)
            .map(|c| c.display_name(&settings.locale))
            .unwrap_or(tx.category_id.as_str());
        println!(
            "{}  {:<14} {:>18}  {:<16} {}",
            tx.occurred_at,
            tx.id,
            format_signed_amount(tx.amount, tx.kind, settings),
            truncate_chars(category, 16),
            truncate_chars(&tx.description, 40)
        );
    }
}

fn print_stats<P: Persister>(session: &Session<P>, config: &Config) {
    let settings = session.settings();
    let stats = session.stats();

    println!("Balance          {}", format_amount(stats.balance, settings));
    println!("Total income     {}", format_amount(stats.total_income, settings));
    println!("Total expenses   {}", format_amount(stats.total_expenses, settings));
    println!("Monthly income   {}", format_amount(stats.monthly_income, settings));
    println!("Monthly expenses {}", format_amount(stats.monthly_expenses, settings));
    println!("Monthly net      {}", format_amount(stats.monthly_balance(), settings));

    if stats.category_breakdown.is_empty() {
        println!("\nNo expenses this month");
        return;
    }
    println!(
        "\nTop spending in {}",
        MonthWindow::containing(SystemClock.today()).label()
    );
    for share in stats.top_categories(config.display.top_categories) {
        println!(
            "  {:<16} {:>18} {:>7}",
            truncate_chars(&share.label, 16),
            format_amount(share.amount, settings),
            format!("{}%", share.percentage.round_dp(1))
        );
    }
}

fn print_categories(kind: Option<TransactionKind>, locale: &str) {
    let registry = CategoryRegistry::builtin();
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => TransactionKind::ALL.to_vec(),
    };
    for kind in kinds {
        println!("{}:", kind);
        for category in registry.for_kind(kind) {
            println!("  {:<14} {:<16} {}", category.id, category.display_name(locale), category.color);
        }
    }
}

fn report_durability(durability: &Durability) {
    if let Durability::Degraded(errors) = durability {
        for error in errors {
            eprintln!("warning: change kept in memory but not saved: {}", error);
        }
    }
}
