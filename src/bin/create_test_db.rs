use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration};

use budgetn::{
    db::{initialize, migrate_to},
    logging::setup_logging,
    today,
    transaction::{RecurringType, Transaction, create_transaction},
};

/// A utility for creating a test database for budgetn.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// Write the schema from before recurring transactions existed, without
    /// migrating it. Useful for checking that old databases upgrade cleanly.
    #[arg(long)]
    legacy: bool,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging("info", None)?;

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    if args.legacy {
        create_legacy_database(&conn, today())?;
    } else {
        initialize(&conn)?;
        create_sample_transactions(&conn, today())?;
    }

    println!("Success!");

    Ok(())
}

fn create_sample_transactions(conn: &Connection, today: Date) -> Result<(), budgetn::Error> {
    println!("Creating sample transactions...");

    let month_start = today.replace_day(1).unwrap_or(today);

    let builders = [
        Transaction::build("Salary", 4200.0, month_start, "Work").recurring(RecurringType::Monthly),
        Transaction::build("Rent", -1650.0, month_start, "Housing")
            .recurring(RecurringType::Monthly)
            .recurring_end_date(month_start.checked_add(Duration::days(365))),
        Transaction::build("Groceries", -142.37, today - Duration::days(3), "Food"),
        Transaction::build("Coffee", -4.5, today - Duration::days(1), "Food"),
        Transaction::build("Sold old bike", 180.0, today - Duration::days(10), "Other"),
        Transaction::build("Gym", -35.0, today - Duration::days(6), "Health")
            .recurring(RecurringType::Weekly),
        Transaction::build("Bus pass", -60.0, today - Duration::days(14), "Transport"),
        Transaction::build("Refund", 0.0, today, "Other"),
    ];

    for builder in builders {
        create_transaction(builder, conn)?;
    }

    Ok(())
}

fn create_legacy_database(conn: &Connection, today: Date) -> Result<(), budgetn::Error> {
    println!("Creating legacy schema...");

    migrate_to(conn, 1)?;
    // Version 0 is what databases created before schema versioning report.
    conn.execute_batch("PRAGMA user_version = 0;")?;

    let mut statement = conn.prepare(
        "INSERT INTO transactions (id, title, amount, date, category) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    for (id, title, amount, days_ago, category) in [
        ("a1b2c3d4e", "Salary", 4200.0, 20, "Work"),
        ("f5g6h7i8j", "Rent", -1650.0, 19, "Housing"),
        ("k9l0m1n2o", "Coffee", -4.5, 1, "Food"),
    ] {
        statement.execute((id, title, amount, today - Duration::days(days_ago), category))?;
    }

    Ok(())
}
