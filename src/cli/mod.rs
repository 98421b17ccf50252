use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::TripService;
use crate::domain::{format_amount, parse_amount};

/// Tripkit - Group Trip Organizer
#[derive(Parser)]
#[command(name = "tripkit")]
#[command(about = "A local-first trip organizer: shared packing lists and expense splitting")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "tripkit.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Trip member management commands
    #[command(subcommand)]
    Person(PersonCommands),

    /// Shared expense commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Packing list commands
    #[command(subcommand)]
    Item(ItemCommands),

    /// Show balance for one person or everyone
    Balance {
        /// Person name (omit for all people)
        person: Option<String>,
    },

    /// Show who owes whom to settle all balances
    Settle,

    /// Show trip overview: spending totals and packing progress
    Summary,

    /// Export data to CSV or JSON
    Export {
        /// What to export: expenses, balances, settlements, items, full
        export_type: String,

        /// Output file (omit for stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import data from CSV
    Import {
        /// What to import: people, expenses
        import_type: String,

        /// Input file (omit for stdin)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate and report without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Skip rows that already exist instead of reporting errors
        #[arg(long)]
        skip_duplicates: bool,

        /// Create people referenced by expenses that don't exist yet
        #[arg(long)]
        create_people: bool,
    },
}

#[derive(Subcommand)]
pub enum PersonCommands {
    /// Add a person to the trip
    Add {
        /// Person's name
        name: String,
    },

    /// List everyone on the trip
    List,

    /// Show a person's balance and commitments
    Show {
        /// Person's name
        name: String,
    },

    /// Remove a person from the trip
    Remove {
        /// Person's name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a shared expense
    Add {
        /// Amount spent (e.g., "50.00" or "50")
        amount: String,

        /// Who paid
        #[arg(long)]
        paid_by: String,

        /// What the money was spent on
        #[arg(short, long)]
        description: String,

        /// Comma-separated names sharing the cost (omit for everyone)
        #[arg(long)]
        shared_with: Option<String>,

        /// Date of the expense (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// List all expenses
    List,

    /// Delete an expense
    Remove {
        /// Expense ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add an item to the packing list
    Add {
        /// Item name
        name: String,

        /// How many the group needs
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },

    /// List the packing list
    List,

    /// Record how many of an item a person will bring
    Assign {
        /// Item name
        item: String,

        /// Person's name
        person: String,

        /// Quantity they will bring (0 clears their commitment)
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },

    /// Mark an item as packed
    Pack {
        /// Item name
        name: String,
    },

    /// Clear an item's packed mark
    Unpack {
        /// Item name
        name: String,
    },

    /// Remove an item from the packing list
    Remove {
        /// Item name
        name: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                TripService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Person(person_cmd) => {
                let service = TripService::connect(&self.database).await?;
                run_person_command(&service, person_cmd).await?;
            }

            Commands::Expense(expense_cmd) => {
                let service = TripService::connect(&self.database).await?;
                run_expense_command(&service, expense_cmd).await?;
            }

            Commands::Item(item_cmd) => {
                let service = TripService::connect(&self.database).await?;
                run_item_command(&service, item_cmd).await?;
            }

            Commands::Balance { person } => {
                let service = TripService::connect(&self.database).await?;
                run_balance_command(&service, person).await?;
            }

            Commands::Settle => {
                let service = TripService::connect(&self.database).await?;
                run_settle_command(&service).await?;
            }

            Commands::Summary => {
                let service = TripService::connect(&self.database).await?;
                run_summary_command(&service).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = TripService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref(), self.verbose).await?;
            }

            Commands::Import {
                import_type,
                input,
                dry_run,
                skip_duplicates,
                create_people,
            } => {
                let service = TripService::connect(&self.database).await?;
                run_import_command(
                    &service,
                    &import_type,
                    input.as_deref(),
                    dry_run,
                    skip_duplicates,
                    create_people,
                    self.verbose,
                )
                .await?;
            }
        }

        Ok(())
    }
}

async fn run_person_command(service: &TripService, cmd: PersonCommands) -> Result<()> {
    match cmd {
        PersonCommands::Add { name } => {
            let person = service.add_person(name).await?;
            println!("Added person: {} ({})", person.name, person.id);
        }

        PersonCommands::List => {
            let people = service.list_people().await?;
            if people.is_empty() {
                println!("Nobody on the trip yet.");
            } else {
                println!("{:<20} {:<12}", "NAME", "JOINED");
                println!("{}", "-".repeat(32));
                for person in people {
                    println!(
                        "{:<20} {:<12}",
                        person.name,
                        person.created_at.format("%Y-%m-%d")
                    );
                }
            }
        }

        PersonCommands::Show { name } => {
            let entry = service.person_balance(&name).await?;
            let report = service.packing_report().await?;
            let carrying = report
                .loads
                .iter()
                .find(|load| load.person.id == entry.person.id)
                .map(|load| load.quantity)
                .unwrap_or(0);

            println!("Person: {}", entry.person.name);
            println!("  ID:       {}", entry.person.id);
            println!(
                "  Joined:   {}",
                entry.person.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("  Balance:  {}", format_amount(entry.balance));
            println!("  Carrying: {} item(s)", carrying);
        }

        PersonCommands::Remove { name } => {
            let person = service.remove_person(&name).await?;
            println!("Removed person: {}", person.name);
            println!("Note: expenses they paid or shared stay recorded; settlement math");
            println!("now ignores their part, and group expenses re-split among the rest.");
        }
    }
    Ok(())
}

async fn run_expense_command(service: &TripService, cmd: ExpenseCommands) -> Result<()> {
    match cmd {
        ExpenseCommands::Add {
            amount,
            paid_by,
            description,
            shared_with,
            date,
        } => {
            let amount =
                parse_amount(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

            let spent_at = match date {
                Some(date_str) => parse_date(&date_str).with_context(|| {
                    format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                })?,
                None => Utc::now(),
            };

            let participants: Vec<String> = shared_with
                .as_deref()
                .unwrap_or("")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            let record = service
                .add_expense(description, amount, &paid_by, &participants, spent_at)
                .await?;

            let shared_with = if record.participant_names.is_empty() {
                "everyone".to_string()
            } else {
                record.participant_names.join(", ")
            };
            println!(
                "Recorded expense: {} paid by {} for {} ({})",
                format_amount(record.expense.amount),
                record.payer_name,
                shared_with,
                record.expense.id
            );
        }

        ExpenseCommands::List => {
            let expenses = service.list_expenses().await?;
            if expenses.is_empty() {
                println!("No expenses recorded.");
                return Ok(());
            }

            let names = service.person_names().await?;
            println!(
                "{:<36} {:<12} {:<24} {:>10}  {:<14} {}",
                "ID", "DATE", "DESCRIPTION", "AMOUNT", "PAID BY", "SHARED WITH"
            );
            println!("{}", "-".repeat(110));
            for expense in &expenses {
                let paid_by = names
                    .get(&expense.payer)
                    .cloned()
                    .unwrap_or_else(|| "(removed)".to_string());
                let shared_with = if expense.is_shared_by_all() {
                    "everyone".to_string()
                } else {
                    expense
                        .shared_by
                        .iter()
                        .map(|id| {
                            names
                                .get(id)
                                .cloned()
                                .unwrap_or_else(|| "(removed)".to_string())
                        })
                        .collect::<Vec<_>>()
                        .join(", ")
                };

                println!(
                    "{:<36} {:<12} {:<24} {:>10}  {:<14} {}",
                    expense.id,
                    expense.spent_at.format("%Y-%m-%d"),
                    truncate(&expense.description, 24),
                    format_amount(expense.amount),
                    paid_by,
                    shared_with
                );
            }
        }

        ExpenseCommands::Remove { id } => {
            let expense_id =
                Uuid::parse_str(&id).context("Invalid expense ID format (expected UUID)")?;
            let removed = service.remove_expense(expense_id).await?;
            match removed.payer_name {
                Some(payer) => println!(
                    "Removed expense: {} ({}, paid by {})",
                    removed.expense.description,
                    format_amount(removed.expense.amount),
                    payer
                ),
                None => println!(
                    "Removed expense: {} ({})",
                    removed.expense.description,
                    format_amount(removed.expense.amount)
                ),
            }
        }
    }
    Ok(())
}

async fn run_item_command(service: &TripService, cmd: ItemCommands) -> Result<()> {
    match cmd {
        ItemCommands::Add { name, quantity } => {
            let item = service.add_item(name, quantity).await?;
            println!("Added item: {} (need {})", item.name, item.needed);
        }

        ItemCommands::List => {
            let items = service.list_items().await?;
            if items.is_empty() {
                println!("Packing list is empty.");
                return Ok(());
            }

            let names = service.person_names().await?;
            println!(
                "{:<6} {:<24} {:>6} {:>9}  {}",
                "", "ITEM", "NEED", "ASSIGNED", "WHO"
            );
            println!("{}", "-".repeat(70));
            for item in items {
                let mut who: Vec<String> = item
                    .assigned
                    .iter()
                    .map(|(id, qty)| {
                        let name = names
                            .get(id)
                            .cloned()
                            .unwrap_or_else(|| "(removed)".to_string());
                        format!("{} x{}", name, qty)
                    })
                    .collect();
                who.sort();

                let mark = if item.is_covered() { "[ok]" } else { "[  ]" };
                println!(
                    "{:<6} {:<24} {:>6} {:>9}  {}",
                    mark,
                    truncate(&item.name, 24),
                    item.needed,
                    item.assigned_quantity(),
                    who.join(", ")
                );
            }
        }

        ItemCommands::Assign {
            item,
            person,
            quantity,
        } => {
            let updated = service.assign_item(&item, &person, quantity).await?;
            if quantity == 0 {
                println!("Cleared {}'s commitment for {}", person, updated.name);
            } else {
                println!(
                    "{} will bring {} of {} ({}/{} covered)",
                    person,
                    quantity,
                    updated.name,
                    updated.assigned_quantity(),
                    updated.needed
                );
            }
        }

        ItemCommands::Pack { name } => {
            let item = service.set_packed(&name, true).await?;
            println!("Packed: {}", item.name);
        }

        ItemCommands::Unpack { name } => {
            let item = service.set_packed(&name, false).await?;
            println!("Unpacked: {}", item.name);
        }

        ItemCommands::Remove { name } => {
            let item = service.remove_item(&name).await?;
            println!("Removed item: {}", item.name);
        }
    }
    Ok(())
}

async fn run_balance_command(service: &TripService, person: Option<String>) -> Result<()> {
    match person {
        Some(name) => {
            let entry = service.person_balance(&name).await?;
            println!("{}: {}", entry.person.name, format_amount(entry.balance));
            if entry.balance > 0.01 {
                println!("  is owed {}", format_amount(entry.balance));
            } else if entry.balance < -0.01 {
                println!("  owes {}", format_amount(-entry.balance));
            } else {
                println!("  all settled");
            }
        }
        None => {
            let balances = service.balances().await?;
            if balances.is_empty() {
                println!("Nobody on the trip yet.");
                return Ok(());
            }

            println!("{:<20} {:>10}", "NAME", "BALANCE");
            println!("{}", "-".repeat(30));
            for entry in balances {
                println!(
                    "{:<20} {:>10}",
                    entry.person.name,
                    format_amount(entry.balance)
                );
            }
        }
    }
    Ok(())
}

async fn run_settle_command(service: &TripService) -> Result<()> {
    let plan = service.settlement_plan().await?;
    let names = service.person_names().await?;

    if plan.settlements.is_empty() {
        println!("All settled - nobody owes anything.");
        return Ok(());
    }

    println!("To settle up:");
    for settlement in &plan.settlements {
        let from = names
            .get(&settlement.from)
            .cloned()
            .unwrap_or_else(|| settlement.from.to_string());
        let to = names
            .get(&settlement.to)
            .cloned()
            .unwrap_or_else(|| settlement.to.to_string());
        println!("  {} pays {} to {}", from, format_amount(settlement.amount), to);
    }

    println!();
    println!("{:<20} {:>10}", "NAME", "BALANCE");
    println!("{}", "-".repeat(30));
    for entry in &plan.balances {
        println!(
            "{:<20} {:>10}",
            entry.person.name,
            format_amount(entry.balance)
        );
    }
    Ok(())
}

async fn run_summary_command(service: &TripService) -> Result<()> {
    let expenses = service.expense_summary().await?;
    let packing = service.packing_report().await?;

    println!("Expenses");
    println!(
        "  Total spent:  {} across {} expense(s)",
        format_amount(expenses.total_spent),
        expenses.expense_count
    );
    match &expenses.top_payer {
        Some(top) => println!(
            "  Top payer:    {} ({})",
            top.person.name,
            format_amount(top.paid)
        ),
        None => println!("  Top payer:    nobody yet"),
    }
    for total in &expenses.paid_totals {
        println!(
            "    {:<18} {:>10}",
            total.person.name,
            format_amount(total.paid)
        );
    }

    println!();
    println!("Packing");
    println!(
        "  Progress:     {}% ({}/{} items covered)",
        packing.progress_percent, packing.covered_items, packing.total_items
    );
    for load in &packing.loads {
        println!("    {:<18} carrying {}", load.person.name, load.quantity);
    }
    Ok(())
}

async fn run_export_command(
    service: &TripService,
    export_type: &str,
    output: Option<&str>,
    verbose: bool,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "expenses" => {
            let count = exporter.export_expenses_csv(writer).await?;
            if verbose {
                eprintln!("Exported {} expenses", count);
            }
        }
        "balances" => {
            let count = exporter.export_balances_csv(writer).await?;
            if verbose {
                eprintln!("Exported {} balances", count);
            }
        }
        "settlements" => {
            let count = exporter.export_settlements_csv(writer).await?;
            if verbose {
                eprintln!("Exported {} settlements", count);
            }
        }
        "items" => {
            let count = exporter.export_items_csv(writer).await?;
            if verbose {
                eprintln!("Exported {} items", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if verbose {
                eprintln!(
                    "Exported full trip: {} people, {} expenses, {} items",
                    snapshot.people.len(),
                    snapshot.expenses.len(),
                    snapshot.items.len()
                );
            }
        }
        other => {
            anyhow::bail!(
                "Unknown export type '{}'. Valid types: expenses, balances, settlements, items, full",
                other
            );
        }
    }
    Ok(())
}

async fn run_import_command(
    service: &TripService,
    import_type: &str,
    input: Option<&str>,
    dry_run: bool,
    skip_duplicates: bool,
    create_people: bool,
    verbose: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    let importer = Importer::new(service);
    let options = ImportOptions {
        dry_run,
        skip_duplicates,
        create_missing_people: create_people,
    };

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let result = match import_type {
        "people" => importer.import_people_csv(reader, options).await?,
        "expenses" => importer.import_expenses_csv(reader, options).await?,
        other => {
            anyhow::bail!(
                "Unknown import type '{}'. Valid types: people, expenses",
                other
            );
        }
    };

    if dry_run {
        println!(
            "Dry run: {} row(s) would be imported, {} skipped",
            result.imported, result.skipped
        );
    } else {
        println!(
            "Imported {} row(s), skipped {}",
            result.imported, result.skipped
        );
    }
    if verbose {
        for error in &result.errors {
            match &error.field {
                Some(field) => eprintln!("  line {}: {} ({})", error.line, error.error, field),
                None => eprintln!("  line {}: {}", error.line, error.error),
            }
        }
    }
    if !result.errors.is_empty() {
        if verbose {
            anyhow::bail!("{} row(s) failed to import", result.errors.len());
        }
        anyhow::bail!(
            "{} row(s) failed to import (rerun with --verbose for details)",
            result.errors.len()
        );
    }
    Ok(())
}

/// Parse a YYYY-MM-DD date string into a UTC timestamp at midnight.
fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?;
    Ok(date
        .and_hms_opt(0, 0, 0)
        .context("Invalid time components")?
        .and_utc())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
