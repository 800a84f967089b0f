use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use time::Date;

use budgetn::{
    Ledger, TransactionId,
    currency::{Currency, format_amount},
    logging::setup_logging,
    parse_date, today,
    transaction::{RecurringType, Summary, Transaction, TransactionFilter, TransactionKind},
};

/// Track income and expenses from the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File path to the application SQLite database.
    #[arg(long, env = "BUDGETN_DB_PATH", default_value = "budgetn.db", global = true)]
    db_path: PathBuf,

    /// The ISO 4217 code of the currency amounts are shown in.
    #[arg(long, env = "BUDGETN_CURRENCY", default_value = "USD", global = true)]
    currency: String,

    /// Append debug logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List transactions, most recent first, followed by the totals.
    List {
        /// Only show transactions whose title contains this text (ignoring case).
        #[arg(long, short, default_value = "")]
        search: String,

        /// Only show income or expenses.
        #[arg(long, short, default_value = "all")]
        kind: TransactionKind,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the balance, income and expense totals.
    Summary {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Record a new transaction and print its ID.
    Add {
        /// A short label, e.g. "Salary".
        #[arg(long)]
        title: String,

        /// Positive for income, negative for expenses.
        #[arg(long, allow_negative_numbers = true, value_parser = parse_amount)]
        amount: f64,

        /// A label used to group transactions, e.g. "Food".
        #[arg(long)]
        category: String,

        /// The date as YYYY-MM-DD. Defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,

        /// Make the transaction repeat: daily, weekly, monthly or yearly.
        #[arg(long)]
        recurring: Option<RecurringType>,

        /// The last date a recurring transaction repeats on, as YYYY-MM-DD.
        #[arg(long, value_parser = parse_date, requires = "recurring")]
        recurring_end_date: Option<Date>,
    },

    /// Change fields of an existing transaction.
    Update {
        /// The ID of the transaction to change.
        id: String,

        #[command(flatten)]
        changes: TransactionChanges,
    },

    /// Delete a transaction.
    Delete {
        /// The ID of the transaction to delete.
        id: String,

        /// Do not ask for confirmation.
        #[arg(long, short)]
        yes: bool,
    },
}

/// The fields to overwrite when updating a transaction. Unset fields are kept.
#[derive(Args, Debug, Default, PartialEq)]
struct TransactionChanges {
    /// A new title.
    #[arg(long)]
    title: Option<String>,

    /// A new amount.
    #[arg(long, allow_negative_numbers = true, value_parser = parse_amount)]
    amount: Option<f64>,

    /// A new date as YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    date: Option<Date>,

    /// A new category.
    #[arg(long)]
    category: Option<String>,

    /// Make the transaction repeat at this interval.
    #[arg(long, conflicts_with = "not_recurring")]
    recurring: Option<RecurringType>,

    /// Stop the transaction from repeating.
    #[arg(long)]
    not_recurring: bool,

    /// A new end date for the repetition, as YYYY-MM-DD.
    #[arg(long, value_parser = parse_date, conflicts_with = "not_recurring")]
    recurring_end_date: Option<Date>,
}

impl TransactionChanges {
    fn apply(self, transaction: &mut Transaction) {
        if let Some(title) = self.title {
            transaction.title = title;
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(category) = self.category {
            transaction.category = category;
        }
        if let Some(interval) = self.recurring {
            transaction.is_recurring = true;
            transaction.recurring_type = Some(interval);
        }
        if self.not_recurring {
            transaction.is_recurring = false;
            transaction.recurring_type = None;
            transaction.recurring_end_date = None;
        }
        if let Some(end_date) = self.recurring_end_date {
            transaction.recurring_end_date = Some(end_date);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    setup_logging("warn", cli.log_file.as_deref())?;

    let currency = Currency::from_code(&cli.currency);
    let ledger = Ledger::open(&cli.db_path).await?;

    match cli.command {
        Command::List { search, kind, json } => {
            let filter = TransactionFilter { search, kind };
            let transactions = ledger.filtered(&filter);
            let summary = ledger.summary();

            if json {
                let output = json!({ "transactions": transactions, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for transaction in &transactions {
                    println!("{}", render_row(transaction, &currency)?);
                }
                println!();
                println!("{}", render_summary(&summary, &currency)?);
            }
        }
        Command::Summary { json } => {
            let summary = ledger.summary();

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", render_summary(&summary, &currency)?);
            }
        }
        Command::Add {
            title,
            amount,
            category,
            date,
            recurring,
            recurring_end_date,
        } => {
            let mut builder =
                Transaction::build(&title, amount, date.unwrap_or_else(today), &category)
                    .recurring_end_date(recurring_end_date);
            if let Some(interval) = recurring {
                builder = builder.recurring(interval);
            }

            let id = ledger.add(builder).await?;
            println!("{id}");
        }
        Command::Update { id, changes } => {
            let mut transaction = ledger.get(TransactionId::new_unchecked(&id)).await?;
            changes.apply(&mut transaction);
            ledger.update(transaction).await?;
        }
        Command::Delete { id, yes } => {
            let transaction = ledger.get(TransactionId::new_unchecked(&id)).await?;

            if !yes && !confirm_delete(&transaction)? {
                println!("Cancelled.");
                return Ok(());
            }

            ledger.delete(transaction.id).await?;
        }
    }

    Ok(())
}

/// Parse an amount, rejecting NaN and infinity since they cannot be stored.
fn parse_amount(text: &str) -> Result<f64, String> {
    let amount: f64 = text
        .trim()
        .parse()
        .map_err(|error| format!("\"{text}\" is not a number: {error}"))?;

    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(format!("\"{text}\" is not a finite amount"))
    }
}

fn render_row(transaction: &Transaction, currency: &Currency) -> Result<String, budgetn::Error> {
    let recurrence = match (transaction.is_recurring, transaction.recurring_type) {
        (true, Some(interval)) => interval.to_string(),
        (true, None) => "recurring".to_owned(),
        (false, _) => String::new(),
    };

    Ok(format!(
        "{}  {:<28} {:<16} {:>14}  {:<8} {}",
        transaction.date,
        transaction.title,
        transaction.category,
        format_amount(transaction.amount, currency)?,
        recurrence,
        transaction.id,
    ))
}

fn render_summary(summary: &Summary, currency: &Currency) -> Result<String, budgetn::Error> {
    Ok(format!(
        "Balance:  {}\nIncome:   {}\nExpenses: {}",
        format_amount(summary.balance, currency)?,
        format_amount(summary.income, currency)?,
        format_amount(summary.expenses, currency)?,
    ))
}

fn confirm_delete(transaction: &Transaction) -> io::Result<bool> {
    print!(
        "Delete \"{}\" on {}? This cannot be undone. [y/N] ",
        transaction.title, transaction.date
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
