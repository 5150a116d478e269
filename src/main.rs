//! Command-line front end for the salon operations backend.
//!
//! Thin presentation layer only: every command wires repositories and the
//! reconciliation workflow from the library and prints their results.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use salon_ops::analytics;
use salon_ops::cache::ReadCache;
use salon_ops::config::AppConfig;
use salon_ops::export::export_appointments;
use salon_ops::logging::{init_logging, OperationTimer};
use salon_ops::metrics::OpsMetrics;
use salon_ops::models::{
    DateRange, Frequency, NewClient, NewFixedExpense, NewRequest, NewService, NewVariableExpense,
    OutputFormat,
};
use salon_ops::repository::{
    AppointmentRepo, CategoryRepo, ClientDelete, ClientRepo, FixedExpenseRepo, RequestRepo,
    ServiceRepo, SheetDb, VariableExpenseRepo,
};
use salon_ops::utils::{current_month_range, parse_iso_date, today};
use salon_ops::validation::InputValidator;
use salon_ops::workflow::RequestWorkflow;
use salon_ops::SqliteStore;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the period summary (defaults to the current month)
    Dashboard {
        /// Start date (YYYY-MM-DD)
        #[arg(short, long)]
        start_date: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(short, long)]
        end_date: Option<String>,
    },
    /// List booking requests (pending only unless --all)
    Requests {
        /// Include confirmed and rejected requests
        #[arg(long)]
        all: bool,
    },
    /// Submit a booking request (the public form path)
    Submit {
        /// Requester name
        #[arg(short, long)]
        name: String,

        /// Requester phone
        #[arg(short, long)]
        phone: String,

        /// Requester email
        #[arg(short, long)]
        email: Option<String>,

        /// Requested service, free text
        #[arg(long)]
        service: String,

        /// Schedule preference, free text (e.g. "2025-04-01 a las 11:00")
        #[arg(long, default_value = "")]
        preference: String,

        /// Additional message
        #[arg(short, long, default_value = "")]
        message: String,
    },
    /// Confirm a pending request, creating client and appointment records
    Confirm {
        /// Request id
        #[arg(short, long)]
        id: i64,

        /// Admin note stored on the request
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// Reject a pending request
    Reject {
        /// Request id
        #[arg(short, long)]
        id: i64,

        /// Admin note stored on the request
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// List active services grouped by category
    Services,
    /// Add a service
    AddService {
        /// Service name
        #[arg(short, long)]
        name: String,

        /// Category id
        #[arg(short, long)]
        category_id: i64,

        /// List price in euros
        #[arg(short, long)]
        price: f64,

        /// Duration in minutes
        #[arg(short, long, default_value = "60")]
        duration: i64,

        /// Supply cost in euros
        #[arg(long, default_value = "0")]
        supply_cost: f64,

        /// Description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Deactivate a service (soft delete)
    RemoveService {
        /// Service id
        #[arg(short, long)]
        id: i64,
    },
    /// List clients, optionally filtered by name or phone
    Clients {
        /// Substring to search in names and phones
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a client
    AddClient {
        /// Client name
        #[arg(short, long)]
        name: String,

        /// Phone number
        #[arg(short, long)]
        phone: Option<String>,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Acquisition channel
        #[arg(short, long, default_value = "Walk-in")]
        channel: String,
    },
    /// Delete a client (refused while appointments reference it)
    DeleteClient {
        /// Client id
        #[arg(short, long)]
        id: i64,
    },
    /// List appointments in a date range (defaults to the current month)
    Appointments {
        /// Start date (YYYY-MM-DD)
        #[arg(short, long)]
        start_date: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(short, long)]
        end_date: Option<String>,
    },
    /// Export appointments in a date range to a file
    Export {
        /// Output format (txt, csv or json); config default when omitted
        #[arg(short, long)]
        format: Option<String>,

        /// Output file; derived from the config output directory when omitted
        #[arg(short, long)]
        output: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(short, long)]
        start_date: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(short, long)]
        end_date: Option<String>,
    },
    /// List expenses and their totals for a date range
    Expenses {
        /// Start date (YYYY-MM-DD)
        #[arg(short, long)]
        start_date: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(short, long)]
        end_date: Option<String>,
    },
    /// Add a fixed (recurring) expense
    AddFixedExpense {
        /// What the expense is for
        #[arg(short, long)]
        concept: String,

        /// Amount per billing period
        #[arg(short, long)]
        amount: f64,

        /// Billing frequency (mensual, trimestral, anual)
        #[arg(short, long, default_value = "mensual")]
        frequency: String,
    },
    /// Add a variable (one-off) expense
    AddVariableExpense {
        /// Expense date (YYYY-MM-DD); today when omitted
        #[arg(short, long)]
        date: Option<String>,

        /// What the expense was for
        #[arg(short, long)]
        concept: String,

        /// Amount spent
        #[arg(short, long)]
        amount: f64,

        /// Expense category
        #[arg(long, default_value = "Otros")]
        category: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; the guard keeps file output alive until exit
    let _log_guard = init_logging(
        Some(&config.log_level()),
        config.logging.file_path.as_deref().map(Path::new),
    )?;

    if let Err(e) = OpsMetrics::init() {
        tracing::debug!("metrics recorder not installed: {e}");
    }

    info!("Starting salon-ops");

    // Parse command line arguments
    let cli = Cli::parse();

    // Wire the store, cache and repositories
    let store = Arc::new(SqliteStore::open(&config.store_path())?);
    let cache = ReadCache::open(
        Path::new(&config.cache.dir),
        Duration::from_secs(config.cache.ttl_secs),
    )?;
    let db = Arc::new(SheetDb::new(store, cache));

    match &cli.command {
        Commands::Dashboard { start_date, end_date } => {
            dashboard(&db, start_date.as_deref(), end_date.as_deref()).await?;
        }
        Commands::Requests { all } => list_requests(&db, *all).await?,
        Commands::Submit { name, phone, email, service, preference, message } => {
            submit_request(&db, name, phone, email.as_deref(), service, preference, message)
                .await?;
        }
        Commands::Confirm { id, note } => confirm_request(&db, *id, note).await?,
        Commands::Reject { id, note } => reject_request(&db, *id, note).await?,
        Commands::Services => list_services(&db).await?,
        Commands::AddService { name, category_id, price, duration, supply_cost, description } => {
            add_service(&db, name, *category_id, *price, *duration, *supply_cost, description)
                .await?;
        }
        Commands::RemoveService { id } => {
            ServiceRepo::new(db.clone()).soft_delete(*id).await?;
            println!("Service {id} deactivated");
        }
        Commands::Clients { search } => list_clients(&db, search.as_deref()).await?,
        Commands::AddClient { name, phone, email, channel } => {
            add_client(&db, name, phone.as_deref(), email.as_deref(), channel).await?;
        }
        Commands::DeleteClient { id } => delete_client(&db, *id).await?,
        Commands::Appointments { start_date, end_date } => {
            list_appointments(&db, start_date.as_deref(), end_date.as_deref()).await?;
        }
        Commands::Export { format, output, start_date, end_date } => {
            export(
                &db,
                &config,
                format.as_deref(),
                output.as_deref(),
                start_date.as_deref(),
                end_date.as_deref(),
            )
            .await?;
        }
        Commands::Expenses { start_date, end_date } => {
            list_expenses(&db, start_date.as_deref(), end_date.as_deref()).await?;
        }
        Commands::AddFixedExpense { concept, amount, frequency } => {
            add_fixed_expense(&db, concept, *amount, frequency).await?;
        }
        Commands::AddVariableExpense { date, concept, amount, category } => {
            add_variable_expense(&db, date.as_deref(), concept, *amount, category).await?;
        }
    }

    Ok(())
}

/// Resolve an optional date pair into an inclusive range, defaulting to the
/// current month.
fn resolve_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    let range = match (start, end) {
        (Some(start), Some(end)) => {
            DateRange { start: parse_iso_date(start)?, end: parse_iso_date(end)? }
        }
        (None, None) => current_month_range(),
        _ => bail!("provide both --start-date and --end-date, or neither"),
    };
    InputValidator::validate_date_range(range.start, range.end)?;
    Ok(range)
}

async fn dashboard(db: &Arc<SheetDb>, start: Option<&str>, end: Option<&str>) -> Result<()> {
    let timer = OperationTimer::new("dashboard");
    let range = resolve_range(start, end)?;

    let appointments = AppointmentRepo::new(db.clone()).list(Some(&range)).await?;
    let fixed = FixedExpenseRepo::new(db.clone()).list_active().await?;
    let variable = VariableExpenseRepo::new(db.clone()).list(Some(&range)).await?;
    let pending = RequestRepo::new(db.clone()).list_pending().await?;

    let summary = analytics::summarize(&appointments, &fixed, &variable);

    println!("Period {} to {}", range.start, range.end);
    println!("  Revenue:           {:>10.2}", summary.total_revenue);
    println!("  Appointments:      {:>10}", summary.appointment_count);
    println!("  Average ticket:    {:>10.2}", summary.average_ticket);
    println!("  Unique clients:    {:>10}", summary.unique_clients);
    println!("  Fixed expenses:    {:>10.2}", summary.total_fixed_expenses);
    println!("  Variable expenses: {:>10.2}", summary.total_variable_expenses);
    if !pending.is_empty() {
        println!("  Pending requests:  {:>10}", pending.len());
    }

    let series = analytics::daily_revenue(&appointments);
    if !series.is_empty() {
        println!("Daily revenue:");
        for (date, revenue) in series {
            println!("  {date}  {revenue:>8.2}");
        }
    }

    timer.finish();
    Ok(())
}

async fn list_requests(db: &Arc<SheetDb>, all: bool) -> Result<()> {
    let repo = RequestRepo::new(db.clone());
    let requests = if all { repo.list().await? } else { repo.list_pending().await? };
    if requests.is_empty() {
        println!("No requests");
        return Ok(());
    }
    for request in requests {
        println!(
            "#{} [{}] {} | {} | {} | {}",
            request.id,
            request.status.as_str(),
            request.name,
            request.phone.as_deref().unwrap_or("-"),
            request.requested_service,
            request.time_preference
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn submit_request(
    db: &Arc<SheetDb>,
    name: &str,
    phone: &str,
    email: Option<&str>,
    service: &str,
    preference: &str,
    message: &str,
) -> Result<()> {
    InputValidator::validate_name(name)?;
    InputValidator::validate_phone(phone)?;
    if let Some(email) = email {
        InputValidator::validate_email(email)?;
    }

    let id = RequestRepo::new(db.clone())
        .submit(&NewRequest {
            name: name.to_string(),
            phone: Some(phone.to_string()),
            email: email.map(ToString::to_string),
            requested_service: service.to_string(),
            time_preference: preference.to_string(),
            message: InputValidator::sanitize_text(message),
        })
        .await?;
    println!("Request #{id} submitted");
    Ok(())
}

async fn confirm_request(db: &Arc<SheetDb>, id: i64, note: &str) -> Result<()> {
    let confirmation = RequestWorkflow::new(db.clone()).confirm(id, note).await?;
    println!(
        "Request #{} confirmed: {} ({}) on {} at {} for {}",
        confirmation.request_id,
        confirmation.client_name,
        confirmation.phone.as_deref().unwrap_or("-"),
        confirmation.date,
        confirmation.time,
        confirmation.service_name
    );
    Ok(())
}

async fn reject_request(db: &Arc<SheetDb>, id: i64, note: &str) -> Result<()> {
    RequestWorkflow::new(db.clone()).reject(id, note).await?;
    println!("Request #{id} rejected");
    Ok(())
}

async fn list_services(db: &Arc<SheetDb>) -> Result<()> {
    let services = ServiceRepo::new(db.clone()).list_active().await?;
    if services.is_empty() {
        println!("No active services");
        return Ok(());
    }
    for service in services {
        println!(
            "#{} {} [{}] {:.2} ({} min)",
            service.id,
            service.name,
            service.category_name.as_deref().unwrap_or("-"),
            service.price,
            service.duration_minutes
        );
    }
    Ok(())
}

async fn add_service(
    db: &Arc<SheetDb>,
    name: &str,
    category_id: i64,
    price: f64,
    duration: i64,
    supply_cost: f64,
    description: &str,
) -> Result<()> {
    InputValidator::validate_name(name)?;
    InputValidator::validate_amount(price)?;
    InputValidator::validate_amount(supply_cost)?;
    InputValidator::validate_duration(duration)?;
    CategoryRepo::new(db.clone())
        .get(category_id)
        .await?
        .with_context(|| format!("category {category_id} not found"))?;

    let id = ServiceRepo::new(db.clone())
        .insert(&NewService {
            name: name.to_string(),
            category_id,
            price,
            duration_minutes: duration,
            supply_cost,
            description: InputValidator::sanitize_text(description),
        })
        .await?;
    println!("Service #{id} created");
    Ok(())
}

async fn list_clients(db: &Arc<SheetDb>, search: Option<&str>) -> Result<()> {
    let mut clients = ClientRepo::new(db.clone()).list().await?;
    if let Some(search) = search {
        let needle = search.to_lowercase();
        clients.retain(|c| {
            c.name.to_lowercase().contains(&needle)
                || c.phone.as_deref().is_some_and(|p| p.contains(&needle))
        });
    }
    println!("{} clients", clients.len());
    for client in clients {
        println!(
            "#{} {} | {} | {}",
            client.id,
            client.name,
            client.phone.as_deref().unwrap_or("-"),
            client.email.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn add_client(
    db: &Arc<SheetDb>,
    name: &str,
    phone: Option<&str>,
    email: Option<&str>,
    channel: &str,
) -> Result<()> {
    InputValidator::validate_name(name)?;
    if let Some(phone) = phone {
        InputValidator::validate_phone(phone)?;
    }
    if let Some(email) = email {
        InputValidator::validate_email(email)?;
    }

    let id = ClientRepo::new(db.clone())
        .insert(&NewClient {
            name: name.to_string(),
            phone: phone.map(ToString::to_string),
            email: email.map(ToString::to_string),
            channel: channel.to_string(),
            notes: String::new(),
        })
        .await?;
    println!("Client #{id} created");
    Ok(())
}

async fn delete_client(db: &Arc<SheetDb>, id: i64) -> Result<()> {
    match ClientRepo::new(db.clone()).delete(id).await? {
        ClientDelete::Deleted => println!("Client {id} deleted"),
        ClientDelete::Blocked { appointments } => {
            println!("Cannot delete client {id}: {appointments} appointment(s) reference it");
        }
    }
    Ok(())
}

async fn list_appointments(db: &Arc<SheetDb>, start: Option<&str>, end: Option<&str>) -> Result<()> {
    let range = resolve_range(start, end)?;
    let appointments = AppointmentRepo::new(db.clone()).list(Some(&range)).await?;
    if appointments.is_empty() {
        println!("No appointments between {} and {}", range.start, range.end);
        return Ok(());
    }
    for appointment in appointments {
        println!(
            "#{} {} {} | {} | {} | {:.2}",
            appointment.id,
            appointment.date,
            appointment.time,
            appointment.client_name.as_deref().unwrap_or("?"),
            appointment.service_name.as_deref().unwrap_or("?"),
            appointment.price_charged
        );
    }
    Ok(())
}

async fn export(
    db: &Arc<SheetDb>,
    config: &AppConfig,
    format: Option<&str>,
    output: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<()> {
    let range = resolve_range(start, end)?;
    let format: OutputFormat = format
        .unwrap_or(&config.export.default_format)
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let path = match output {
        Some(output) => PathBuf::from(output),
        None => PathBuf::from(&config.export.output_directory).join(format!(
            "citas_{}_{}.{}",
            range.start,
            range.end,
            format.extension()
        )),
    };

    let appointments = AppointmentRepo::new(db.clone()).list(Some(&range)).await?;
    export_appointments(&appointments, format, &path)?;
    println!("Exported {} appointment(s) to {}", appointments.len(), path.display());
    Ok(())
}

async fn list_expenses(db: &Arc<SheetDb>, start: Option<&str>, end: Option<&str>) -> Result<()> {
    let range = resolve_range(start, end)?;
    let fixed = FixedExpenseRepo::new(db.clone()).list_active().await?;
    let variable = VariableExpenseRepo::new(db.clone()).list(Some(&range)).await?;

    println!("Fixed expenses:");
    for expense in &fixed {
        println!(
            "  #{} {} {:.2} ({})",
            expense.id,
            expense.concept,
            expense.amount,
            expense.frequency.as_str()
        );
    }
    println!("Variable expenses ({} to {}):", range.start, range.end);
    for expense in &variable {
        println!(
            "  #{} {} {} {:.2} [{}]",
            expense.id, expense.date, expense.concept, expense.amount, expense.category
        );
    }
    println!(
        "Totals: fixed {:.2}, variable {:.2}",
        analytics::total_fixed_expenses(&fixed),
        analytics::total_variable_expenses(&variable)
    );
    Ok(())
}

async fn add_fixed_expense(
    db: &Arc<SheetDb>,
    concept: &str,
    amount: f64,
    frequency: &str,
) -> Result<()> {
    InputValidator::validate_name(concept)?;
    InputValidator::validate_amount(amount)?;
    let id = FixedExpenseRepo::new(db.clone())
        .insert(&NewFixedExpense {
            concept: concept.to_string(),
            amount,
            frequency: Frequency::from_wire(frequency),
            notes: String::new(),
        })
        .await?;
    println!("Fixed expense #{id} created");
    Ok(())
}

async fn add_variable_expense(
    db: &Arc<SheetDb>,
    date: Option<&str>,
    concept: &str,
    amount: f64,
    category: &str,
) -> Result<()> {
    InputValidator::validate_name(concept)?;
    InputValidator::validate_amount(amount)?;
    let date = match date {
        Some(date) => parse_iso_date(date)?,
        None => today(),
    };
    let id = VariableExpenseRepo::new(db.clone())
        .insert(&NewVariableExpense {
            date,
            concept: concept.to_string(),
            amount,
            category: category.to_string(),
            notes: String::new(),
        })
        .await?;
    println!("Variable expense #{id} created");
    Ok(())
}
