//! Workshop Tracker
//!
//! Records workshop income and expenses, manages profiles and class types,
//! and produces summaries and exports. Runs as a CLI or as an HTTP server.

mod aggregate;
mod api;
mod catalog;
mod config;
mod constants;
mod contributors;
mod documents;
mod expenses;
mod export;
mod fetch;
mod incomes;
mod money;
mod notify;
mod ooxml;
mod present;
mod profiles;
mod reports;
mod store;
mod validation;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::{ClassType, Client};
use config::Config;
use contributors::{LedgerFilter, SortDirection, SortField};
use documents::{Document, DocumentLink};
use expenses::ExpenseInput;
use export::{ExportFormat, ExportView};
use incomes::IncomeInput;
use profiles::{AuthContext, Profile, Role, Scope};
use reports::{ReportKind, ReportOptions};
use store::Store;

#[derive(Parser, Debug)]
#[command(name = "workshop-tracker")]
#[command(about = "Income, expense and reporting tracker for workshop businesses")]
struct Args {
    /// Config file (optional; defaults apply when missing)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Store database path (overrides config and environment)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Profile id to act as; admin-only commands require an admin
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Year assumed for legacy month names without a year (default: this year)
    #[arg(long, global = true)]
    reference_year: Option<i32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Manage expenses
    Expense {
        #[command(subcommand)]
        action: ExpenseCommand,
    },

    /// Manage workshop incomes
    Income {
        #[command(subcommand)]
        action: IncomeCommand,
    },

    /// Manage class types (admin)
    ClassType {
        #[command(subcommand)]
        action: ClassTypeCommand,
    },

    /// Manage user profiles
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// Manage clients
    Client {
        #[command(subcommand)]
        action: ClientCommand,
    },

    /// Manage supporting document metadata
    Document {
        #[command(subcommand)]
        action: DocumentCommand,
    },

    /// Print the workshop summary
    Report {
        /// Restrict to one calendar year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Show the contributor ledger
    Contributors {
        #[command(flatten)]
        ledger: LedgerArgs,
    },

    /// Export a report to CSV, xlsx, JSON or docx
    Export {
        #[arg(long, value_enum)]
        report: ReportKind,

        #[arg(long, value_enum)]
        format: ExportFormat,

        /// Output file (default: workshop-<report>-<date>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Restrict to one calendar year
        #[arg(long)]
        year: Option<i32>,

        #[command(flatten)]
        ledger: LedgerArgs,
    },
}

/// Contributor ledger filters and sort order
#[derive(clap::Args, Debug, Default)]
struct LedgerArgs {
    /// First transaction date to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last transaction date to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Case-insensitive match on payer or record name
    #[arg(long)]
    search: Option<String>,

    /// Keep contributors whose total is at least this amount
    #[arg(long)]
    min_total: Option<f64>,

    #[arg(long, value_enum, default_value_t = SortField::Total)]
    sort: SortField,

    #[arg(long, value_enum, default_value_t = SortDirection::Desc)]
    direction: SortDirection,
}

impl LedgerArgs {
    fn filter(&self) -> LedgerFilter {
        LedgerFilter {
            from: self.from,
            to: self.to,
            search: self.search.clone(),
            min_total: self.min_total,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    /// List expenses (own records with --user, all otherwise)
    List,

    /// Add a new expense
    Add {
        #[command(flatten)]
        fields: ExpenseFields,
    },

    /// Overwrite an expense by ID
    Update {
        /// Expense ID to update
        id: i64,

        #[command(flatten)]
        fields: ExpenseFields,
    },

    /// Delete an expense by ID
    Delete {
        /// Expense ID to delete
        id: i64,
    },

    /// Import expenses from CSV file
    Import {
        /// Path to CSV file
        file: PathBuf,
    },

    /// Export expenses to CSV file
    Export {
        /// Path to output CSV file
        file: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct ExpenseFields {
    /// Month (YYYY-MM, or a month name)
    #[arg(long)]
    month: String,

    /// What was bought
    #[arg(long)]
    name: String,

    /// Amount in USD
    #[arg(long)]
    cost: f64,

    /// Who paid
    #[arg(long, default_value = "")]
    paid_by: String,

    #[arg(long, default_value = "")]
    category: String,
}

impl ExpenseFields {
    fn into_input(self, user_id: String) -> ExpenseInput {
        ExpenseInput {
            user_id,
            month: self.month,
            name: self.name,
            cost: self.cost,
            who_paid: self.paid_by,
            category: self.category,
        }
    }
}

#[derive(Subcommand, Debug)]
enum IncomeCommand {
    /// List incomes (own records with --user, all otherwise)
    List,

    /// Record a workshop
    Add {
        /// Workshop date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        #[arg(long, default_value = "")]
        name: String,

        /// Booking platform
        #[arg(long, default_value = "")]
        platform: String,

        #[arg(long, default_value = "")]
        class_type: String,

        #[arg(long, default_value_t = 0)]
        guests: i64,

        /// Amount received in USD
        #[arg(long)]
        payment: f64,

        #[arg(long, default_value_t = 0.0)]
        shipping: f64,

        /// Material cost per guest (default: the class type's rate)
        #[arg(long)]
        cost_per_guest: Option<f64>,
    },

    /// Delete an income by ID
    Delete {
        /// Income ID to delete
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum ClassTypeCommand {
    /// List class types
    List,

    /// Add a class type
    Add {
        name: String,

        /// Material cost per person in USD
        #[arg(long)]
        cost_per_person: f64,
    },

    /// Delete a class type by ID
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// List profiles
    List,

    /// Add or overwrite a profile
    Add {
        /// Profile id issued by the auth service
        #[arg(long)]
        id: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "")]
        full_name: String,

        #[arg(long)]
        phone: Option<String>,

        /// Defaults to the existing role, or user for a new profile
        #[arg(long)]
        role: Option<Role>,

        /// Checked against the password rules before it is handed to the auth service
        #[arg(long)]
        password: Option<String>,
    },

    /// Change a profile's role
    SetRole { id: String, role: Role },

    /// Email a sign-in invitation to a profile
    Invite { id: String },
}

#[derive(Subcommand, Debug)]
enum ClientCommand {
    /// List clients
    List,

    /// Add a client
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum DocumentCommand {
    /// List documents, optionally only those attached to a record
    List {
        /// income, expense, workshop or client
        #[arg(long, requires = "id")]
        kind: Option<String>,

        #[arg(long, requires = "kind")]
        id: Option<i64>,
    },

    /// Record metadata for an uploaded document
    Add {
        #[arg(long)]
        file_name: String,

        /// Object storage URL
        #[arg(long)]
        url: String,

        /// Size in bytes
        #[arg(long, default_value_t = 0)]
        size: i64,

        /// MIME type
        #[arg(long, default_value = "")]
        file_type: String,

        /// e.g. receipt, invoice, contract
        #[arg(long, default_value = "")]
        document_type: String,

        /// income, expense, workshop or client
        #[arg(long, requires = "id")]
        kind: Option<String>,

        #[arg(long, requires = "kind")]
        id: Option<i64>,
    },

    /// Delete document metadata by ID
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(path) = &args.store {
        config.store_path = path.clone();
    }
    let reference_year = args.reference_year.unwrap_or_else(|| Local::now().year());

    let store = Store::open(&config.store_path).await?;
    let cli = Cli {
        store: &store,
        config: &config,
        user: args.user.as_deref(),
        reference_year,
    };

    let result = match args.command {
        Command::Serve { bind } => serve(store.clone(), config.clone(), bind, reference_year).await,
        Command::Expense { action } => handle_expense_command(action, &cli).await,
        Command::Income { action } => handle_income_command(action, &cli).await,
        Command::ClassType { action } => handle_class_type_command(action, &cli).await,
        Command::Profile { action } => handle_profile_command(action, &cli).await,
        Command::Client { action } => handle_client_command(action, &cli).await,
        Command::Document { action } => handle_document_command(action, &cli).await,
        Command::Report { year } => handle_report(year, &cli).await,
        Command::Contributors { ledger } => handle_contributors(ledger, &cli).await,
        Command::Export {
            report,
            format,
            output,
            year,
            ledger,
        } => handle_export(report, format, output, year, ledger, &cli).await,
    };

    store.close().await;
    result
}

/// Per-invocation context shared by the command handlers
struct Cli<'a> {
    store: &'a Store,
    config: &'a Config,
    user: Option<&'a str>,
    reference_year: i32,
}

impl Cli<'_> {
    /// The acting user, required for commands that record ownership or need a role
    async fn auth(&self) -> Result<AuthContext> {
        let user = self
            .user
            .context("This command needs --user <profile id>")?;
        fetch::resolve_auth(self.store, user).await
    }

    /// Own records with --user (all of them for an admin), every record otherwise
    async fn scope(&self) -> Result<Scope> {
        match self.user {
            Some(_) => Ok(self.auth().await?.scope()),
            None => Ok(Scope::All),
        }
    }

    async fn require_admin(&self, action: &str) -> Result<AuthContext> {
        let auth = self.auth().await?;
        auth.require_admin(action)?;
        Ok(auth)
    }

    /// The acting user, who must be `owner` or an admin
    async fn require_owner(&self, owner: &str, action: &str) -> Result<AuthContext> {
        let auth = self.auth().await?;
        if auth.user_id != owner {
            auth.require_admin(action)?;
        }
        Ok(auth)
    }
}

// =============================================================================
// Server
// =============================================================================

async fn serve(
    store: Store,
    mut config: Config,
    bind: Option<String>,
    reference_year: i32,
) -> Result<()> {
    if let Some(bind) = bind {
        config.bind = bind;
    }
    let bind = config.bind.clone();

    let state = api::AppState {
        store,
        config: Arc::new(config),
        reference_year,
    };
    let app = api::create_router(state)?;

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("Workshop Tracker API listening on http://{}", bind);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

// =============================================================================
// Expenses & Incomes
// =============================================================================

async fn handle_expense_command(action: ExpenseCommand, cli: &Cli<'_>) -> Result<()> {
    match action {
        ExpenseCommand::List => {
            let expenses = cli.store.list_expenses(&cli.scope().await?).await?;
            if expenses.is_empty() {
                println!("No expenses recorded.");
                println!("\nUse 'workshop-tracker expense add' to add expenses");
                println!("Or 'workshop-tracker expense import <file.csv>' to import from CSV");
                return Ok(());
            }

            println!(
                "{:<4} {:<8} {:<24} {:<14} {:<12} {:>12}",
                "ID", "Month", "Name", "Category", "Paid By", "Cost"
            );
            println!("{}", "-".repeat(80));
            for expense in &expenses {
                println!(
                    "{:<4} {:<8} {:<24} {:<14} {:<12} {:>12}",
                    expense.id.map(|i| i.to_string()).unwrap_or_default(),
                    expense
                        .period(cli.reference_year)
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| expense.month.clone()),
                    truncate(&expense.name, 24),
                    truncate(&expense.category, 14),
                    truncate(&expense.who_paid, 12),
                    money::format_usd(expense.cost),
                );
            }
            println!("{}", "-".repeat(80));
            println!(
                "{:>66} {:>12}",
                "Total:",
                money::format_usd(expenses::total_expenses(&expenses))
            );
            println!("\n{} expense(s)", expenses.len());
            Ok(())
        }

        ExpenseCommand::Add { fields } => {
            let auth = cli.auth().await?;
            let input = fields.into_input(auth.user_id);
            let expense = validation::validate_expense(input, cli.reference_year)?;
            let id = cli.store.add_expense(&expense).await?;
            println!(
                "Added expense #{}: {} - {}",
                id,
                expense.name,
                money::format_usd(expense.cost)
            );
            Ok(())
        }

        ExpenseCommand::Update { id, fields } => {
            let existing = cli
                .store
                .get_expense(id)
                .await?
                .with_context(|| format!("Expense #{id} not found"))?;
            cli.require_owner(&existing.user_id, "edit another user's expense")
                .await?;

            let input = fields.into_input(existing.user_id);
            let mut expense = validation::validate_expense(input, cli.reference_year)?;
            expense.created_at = existing.created_at;
            cli.store.update_expense(id, &expense).await?;
            println!("Updated expense #{}", id);
            Ok(())
        }

        ExpenseCommand::Delete { id } => {
            let Some(existing) = cli.store.get_expense(id).await? else {
                println!("Expense #{} not found", id);
                return Ok(());
            };
            cli.require_owner(&existing.user_id, "delete another user's expense")
                .await?;

            if cli.store.delete_expense(id).await? {
                println!("Deleted expense #{}", id);
            } else {
                println!("Expense #{} not found", id);
            }
            Ok(())
        }

        ExpenseCommand::Import { file } => {
            let owner = cli.user.map(str::to_string);
            let mut records = Vec::new();
            for (row, record) in expenses::load_from_csv(&file)?.into_iter().enumerate() {
                let year = record
                    .created_at
                    .map(|c| c.year())
                    .unwrap_or(cli.reference_year);
                let input = ExpenseInput {
                    user_id: owner.clone().unwrap_or(record.user_id),
                    month: record.month,
                    name: record.name,
                    cost: record.cost,
                    who_paid: record.who_paid,
                    category: record.category,
                };
                let mut expense = validation::validate_expense(input, year)
                    .with_context(|| format!("Row {} of {}", row + 1, file.display()))?;
                expense.created_at = record.created_at;
                records.push(expense);
            }

            let count = cli.store.import_expenses(&records).await?;
            println!("Imported {} expenses from {}", count, file.display());
            Ok(())
        }

        ExpenseCommand::Export { file } => {
            let expenses = cli.store.list_expenses(&cli.scope().await?).await?;
            expenses::export_to_csv(&expenses, &file)?;
            println!("Exported {} expenses to {}", expenses.len(), file.display());
            Ok(())
        }
    }
}

async fn handle_income_command(action: IncomeCommand, cli: &Cli<'_>) -> Result<()> {
    match action {
        IncomeCommand::List => {
            let incomes = cli.store.list_incomes(&cli.scope().await?).await?;
            if incomes.is_empty() {
                println!("No workshops recorded.");
                println!("\nUse 'workshop-tracker income add' to record one");
                return Ok(());
            }

            println!(
                "{:<4} {:<10} {:<20} {:<12} {:>6} {:>12} {:>12} {:>12}",
                "ID", "Date", "Name", "Class", "Guests", "Payment", "Cost", "Profit"
            );
            println!("{}", "-".repeat(96));
            for income in &incomes {
                println!(
                    "{:<4} {:<10} {:<20} {:<12} {:>6} {:>12} {:>12} {:>12}",
                    income.id.map(|i| i.to_string()).unwrap_or_default(),
                    income.date.map(|d| d.to_string()).unwrap_or_default(),
                    truncate(&income.name, 20),
                    truncate(&income.class_type, 12),
                    income.guest_count,
                    money::format_usd(income.payment),
                    money::format_usd(income.total_cost),
                    money::format_usd(income.profit),
                );
            }
            println!("{}", "-".repeat(96));
            let stats = aggregate::workshop_stats(&incomes);
            println!(
                "{:>57} {:>12} {:>12} {:>12}",
                "Total:",
                money::format_usd(stats.revenue),
                money::format_usd(stats.costs),
                money::format_usd(stats.profit)
            );
            println!("\n{} workshop(s)", incomes.len());
            Ok(())
        }

        IncomeCommand::Add {
            date,
            name,
            platform,
            class_type,
            guests,
            payment,
            shipping,
            cost_per_guest,
        } => {
            let auth = cli.auth().await?;
            let class_types = cli.store.list_class_types().await?;
            let input = IncomeInput {
                user_id: auth.user_id,
                date,
                platform,
                class_type,
                guest_count: guests,
                payment,
                shipping_cost: shipping,
                cost_per_guest,
                name,
            };
            let income = validation::validate_income(input, &class_types)?;
            let id = cli.store.add_income(&income).await?;
            println!(
                "Added workshop #{}: {} payment, {} cost, {} profit",
                id,
                money::format_usd(income.payment),
                money::format_usd(income.total_cost),
                money::format_usd(income.profit)
            );
            Ok(())
        }

        IncomeCommand::Delete { id } => {
            let Some(existing) = cli.store.get_income(id).await? else {
                println!("Income #{} not found", id);
                return Ok(());
            };
            cli.require_owner(&existing.user_id, "delete another user's income")
                .await?;

            if cli.store.delete_income(id).await? {
                println!("Deleted income #{}", id);
            } else {
                println!("Income #{} not found", id);
            }
            Ok(())
        }
    }
}

// =============================================================================
// Lookups & Profiles
// =============================================================================

async fn handle_class_type_command(action: ClassTypeCommand, cli: &Cli<'_>) -> Result<()> {
    match action {
        ClassTypeCommand::List => {
            let class_types = cli.store.list_class_types().await?;
            if class_types.is_empty() {
                println!("No class types defined.");
                return Ok(());
            }
            println!("{:<4} {:<30} {:>14}", "ID", "Name", "Cost/Person");
            println!("{}", "-".repeat(50));
            for class_type in &class_types {
                println!(
                    "{:<4} {:<30} {:>14}",
                    class_type.id.map(|i| i.to_string()).unwrap_or_default(),
                    truncate(&class_type.name, 30),
                    money::format_usd(class_type.cost_per_person)
                );
            }
            Ok(())
        }

        ClassTypeCommand::Add {
            name,
            cost_per_person,
        } => {
            cli.require_admin("manage class types").await?;
            let class_type = ClassType {
                id: None,
                name,
                cost_per_person,
            };
            validation::validate_class_type(&class_type)?;
            let id = cli.store.add_class_type(&class_type).await?;
            println!("Added class type #{}: {}", id, class_type.name);
            Ok(())
        }

        ClassTypeCommand::Delete { id } => {
            cli.require_admin("manage class types").await?;
            if cli.store.delete_class_type(id).await? {
                println!("Deleted class type #{}", id);
            } else {
                println!("Class type #{} not found", id);
            }
            Ok(())
        }
    }
}

async fn handle_profile_command(action: ProfileCommand, cli: &Cli<'_>) -> Result<()> {
    match action {
        ProfileCommand::List => {
            let profiles = cli.store.list_profiles().await?;
            if profiles.is_empty() {
                println!("No profiles.");
                return Ok(());
            }
            println!("{:<24} {:<16} {:<24} {:<6} Email", "ID", "Username", "Name", "Role");
            println!("{}", "-".repeat(96));
            for p in &profiles {
                println!(
                    "{:<24} {:<16} {:<24} {:<6} {}",
                    truncate(&p.id, 24),
                    truncate(&p.username, 16),
                    truncate(&p.full_name, 24),
                    p.role.to_string(),
                    p.email
                );
            }
            Ok(())
        }

        ProfileCommand::Add {
            id,
            username,
            email,
            full_name,
            phone,
            role,
            password,
        } => {
            if let Some(password) = &password {
                validation::validate_password(password)?;
            }

            let existing = cli.store.get_profile(&id).await?;
            let role = role
                .or(existing.as_ref().map(|p| p.role))
                .unwrap_or_default();

            match &existing {
                Some(current) => {
                    cli.require_owner(&current.id, "edit another user's profile")
                        .await?;
                    if current.role != role {
                        cli.require_admin("change roles").await?;
                    }
                }
                None if role == Role::Admin => {
                    // Only the first admin may be created without acting as one
                    let has_admin = cli
                        .store
                        .list_profiles()
                        .await?
                        .iter()
                        .any(|p| p.role == Role::Admin);
                    if has_admin {
                        cli.require_admin("create admin profiles").await?;
                    }
                }
                None => {}
            }

            let profile = Profile {
                id,
                full_name,
                username,
                role,
                email,
                phone_number: phone,
                avatar_url: existing.and_then(|p| p.avatar_url),
            };
            validation::validate_profile(&profile, cli.config.email_domain.as_deref())?;
            cli.store.upsert_profile(&profile).await?;
            println!("Saved profile {} ({}, {})", profile.id, profile.username, profile.role);
            if password.is_some() {
                println!("Password meets the rules; set it through the auth service sign-up.");
            }
            Ok(())
        }

        ProfileCommand::SetRole { id, role } => {
            cli.require_admin("change roles").await?;
            if cli.store.set_role(&id, role).await? {
                println!("Profile {} is now {}", id, role);
            } else {
                println!("Profile {} not found", id);
            }
            Ok(())
        }

        ProfileCommand::Invite { id } => {
            cli.require_admin("send invitations").await?;
            let functions = cli
                .config
                .functions
                .as_ref()
                .context(
                    "Invites need a [functions] section \
                     (or WORKSHOP_FUNCTIONS_URL / WORKSHOP_FUNCTIONS_KEY)",
                )?;
            let profile = cli
                .store
                .get_profile(&id)
                .await?
                .with_context(|| format!("Profile {id} not found"))?;
            validation::validate_email(&profile.email)?;

            let email = notify::invite_email(&profile, &cli.config.frontend_origin);
            notify::send_email(functions, &email).await?;
            println!("Invitation sent to {}", email.to);
            Ok(())
        }
    }
}

async fn handle_client_command(action: ClientCommand, cli: &Cli<'_>) -> Result<()> {
    match action {
        ClientCommand::List => {
            let clients = cli.store.list_clients().await?;
            if clients.is_empty() {
                println!("No clients.");
                return Ok(());
            }
            println!(
                "{:<4} {:<24} {:<20} {:>12} {:>8} {:>12} {:<6}",
                "ID", "Name", "Company", "Spent", "Sessions", "Avg", "Active"
            );
            println!("{}", "-".repeat(94));
            for c in &clients {
                println!(
                    "{:<4} {:<24} {:<20} {:>12} {:>8} {:>12} {:<6}",
                    c.id.map(|i| i.to_string()).unwrap_or_default(),
                    truncate(&c.full_name, 24),
                    truncate(c.company.as_deref().unwrap_or(""), 20),
                    money::format_usd(c.total_spent),
                    c.total_sessions,
                    money::format_usd(catalog::average_spend(c)),
                    if c.is_active { "yes" } else { "no" }
                );
            }
            Ok(())
        }

        ClientCommand::Add {
            name,
            email,
            company,
        } => {
            if let Some(email) = &email {
                validation::validate_email(email)?;
            }
            let client = Client {
                id: None,
                full_name: name,
                email,
                company,
                total_spent: 0.0,
                total_sessions: 0,
                is_active: true,
            };
            let id = cli.store.add_client(&client).await?;
            println!("Added client #{}: {}", id, client.full_name);
            Ok(())
        }
    }
}

async fn handle_document_command(action: DocumentCommand, cli: &Cli<'_>) -> Result<()> {
    match action {
        DocumentCommand::List { kind, id } => {
            let link = parse_link(kind.as_deref(), id)?;
            let documents = cli.store.list_documents(link).await?;
            if documents.is_empty() {
                println!("No documents.");
                return Ok(());
            }
            println!(
                "{:<4} {:<28} {:<12} {:>10} {:<14} URL",
                "ID", "File", "Type", "Size", "Linked To"
            );
            println!("{}", "-".repeat(96));
            for d in &documents {
                println!(
                    "{:<4} {:<28} {:<12} {:>10} {:<14} {}",
                    d.id.map(|i| i.to_string()).unwrap_or_default(),
                    truncate(&d.file_name, 28),
                    truncate(&d.document_type, 12),
                    documents::format_file_size(d.file_size),
                    d.link.to_string(),
                    d.file_url
                );
            }
            Ok(())
        }

        DocumentCommand::Add {
            file_name,
            url,
            size,
            file_type,
            document_type,
            kind,
            id,
        } => {
            let auth = cli.auth().await?;
            let document = Document {
                id: None,
                file_name,
                file_url: url,
                file_size: size.max(0),
                file_type,
                uploaded_by: auth.user_id,
                document_type,
                link: parse_link(kind.as_deref(), id)?.unwrap_or_default(),
            };
            let doc_id = cli.store.add_document(&document).await?;
            println!("Added document #{}: {} ({})", doc_id, document.file_name, document.link);
            Ok(())
        }

        DocumentCommand::Delete { id } => {
            let Some(existing) = cli.store.get_document(id).await? else {
                println!("Document #{} not found", id);
                return Ok(());
            };
            cli.require_owner(&existing.uploaded_by, "delete another user's document")
                .await?;

            if cli.store.delete_document(id).await? {
                println!("Deleted document #{}", id);
            } else {
                println!("Document #{} not found", id);
            }
            Ok(())
        }
    }
}

fn parse_link(kind: Option<&str>, id: Option<i64>) -> Result<Option<DocumentLink>> {
    match (kind, id) {
        (Some(kind), Some(id)) => {
            let kind = kind.trim().to_ascii_lowercase();
            match DocumentLink::from_parts(Some(kind.as_str()), Some(id)) {
                DocumentLink::None => anyhow::bail!(
                    "Unknown document link '{}'. Use income, expense, workshop or client.",
                    kind
                ),
                link => Ok(Some(link)),
            }
        }
        _ => Ok(None),
    }
}

// =============================================================================
// Reports & Exports
// =============================================================================

async fn handle_report(year: Option<i32>, cli: &Cli<'_>) -> Result<()> {
    let scope = cli.scope().await?;
    let dataset = fetch::fetch_dataset(cli.store, &scope).await?;
    reports::print_summary(&dataset, year, cli.reference_year);

    let stats = cli.store.stats().await?;
    println!("Store: {}", stats);
    Ok(())
}

async fn handle_contributors(ledger: LedgerArgs, cli: &Cli<'_>) -> Result<()> {
    let scope = cli.scope().await?;
    let dataset = fetch::fetch_dataset(cli.store, &scope).await?;
    let options = ReportOptions {
        reference_year: cli.reference_year,
        year: None,
        ledger: ledger.filter(),
        sort: ledger.sort,
        direction: ledger.direction,
    };

    let kind = ReportKind::Contributors;
    let view = reports::build_view(kind, &dataset, &scope, &options, Utc::now());
    if view.rows.is_empty() {
        println!("No contributors match.");
        return Ok(());
    }
    print_view(&view);
    Ok(())
}

async fn handle_export(
    report: ReportKind,
    format: ExportFormat,
    output: Option<PathBuf>,
    year: Option<i32>,
    ledger: LedgerArgs,
    cli: &Cli<'_>,
) -> Result<()> {
    let scope = cli.scope().await?;
    let dataset = fetch::fetch_dataset(cli.store, &scope).await?;
    let options = ReportOptions {
        reference_year: cli.reference_year,
        year,
        ledger: ledger.filter(),
        sort: ledger.sort,
        direction: ledger.direction,
    };

    let now = Utc::now();
    let view = reports::build_view(report, &dataset, &scope, &options, now);
    let bytes = export::render(&view, format)?;
    let path = output
        .unwrap_or_else(|| PathBuf::from(reports::file_name(report, format, now.date_naive())));
    export::write_atomic(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "Exported {} ({} rows) to {}",
        view.title,
        view.rows.len(),
        path.display()
    );
    Ok(())
}

/// Print a view's summary and table to the console
fn print_view(view: &ExportView) {
    println!("\n{}", view.title);
    for (label, value) in &view.summary {
        println!("  {:<20}{:>14}", format!("{label}:"), value.display());
    }

    let mut builder = Builder::default();
    builder.push_record(view.columns.iter().cloned());
    for row in &view.rows {
        builder.push_record(row.iter().map(|cell| cell.display()));
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", table);
}

/// Truncate to `max_len` characters, marking the cut with "..."
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use crate::store::tests::{expense, income};

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer name", 8), "a lon...");
        assert_eq!(truncate("céramique", 6), "cér...");
    }

    #[test]
    fn test_parse_link() {
        assert_eq!(parse_link(Some("Expense"), Some(4)).unwrap(), Some(DocumentLink::Expense(4)));
        assert_eq!(parse_link(None, None).unwrap(), None);
        assert!(parse_link(Some("invoice"), Some(1)).is_err());
    }

    #[test]
    fn test_cli_parses_export() {
        let args = Args::try_parse_from([
            "workshop-tracker",
            "export",
            "--report",
            "contributors",
            "--format",
            "xlsx",
            "--min-total",
            "15",
            "--sort",
            "last-transaction",
            "--user",
            "admin",
        ])
        .unwrap();

        assert_eq!(args.user.as_deref(), Some("admin"));
        match args.command {
            Command::Export {
                report,
                format,
                ledger,
                ..
            } => {
                assert_eq!(report, ReportKind::Contributors);
                assert_eq!(format, ExportFormat::Xlsx);
                assert_eq!(ledger.min_total, Some(15.0));
                assert_eq!(ledger.sort, SortField::LastTransaction);
                assert_eq!(ledger.direction, SortDirection::Desc);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_role() {
        let args =
            Args::try_parse_from(["workshop-tracker", "profile", "set-role", "p1", "admin"])
                .unwrap();
        assert!(matches!(
            args.command,
            Command::Profile {
                action: ProfileCommand::SetRole { role: Role::Admin, .. }
            }
        ));
    }

    // =========================================================================
    // Command handlers
    // =========================================================================

    fn profile(id: &str, role: Role) -> Profile {
        Profile {
            id: id.to_string(),
            full_name: format!("{id} name"),
            username: id.to_string(),
            role,
            email: format!("{id}@example.com"),
            phone_number: None,
            avatar_url: None,
        }
    }

    /// Store with one admin and two users
    async fn seeded() -> Store {
        let store = Store::open_in_memory().await.unwrap();
        store.upsert_profile(&profile("admin", Role::Admin)).await.unwrap();
        store.upsert_profile(&profile("u1", Role::User)).await.unwrap();
        store.upsert_profile(&profile("u2", Role::User)).await.unwrap();
        store
    }

    fn test_config() -> Config {
        Config::resolve(&FileConfig::default(), |_| None)
    }

    fn cli<'a>(store: &'a Store, config: &'a Config, user: Option<&'a str>) -> Cli<'a> {
        Cli {
            store,
            config,
            user,
            reference_year: 2025,
        }
    }

    fn profile_add(id: &str, role: Option<Role>) -> ProfileCommand {
        ProfileCommand::Add {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{id}@example.com"),
            full_name: "Renamed".to_string(),
            phone: None,
            role,
            password: None,
        }
    }

    fn expense_fields(cost: f64) -> ExpenseFields {
        ExpenseFields {
            month: "2025-01".to_string(),
            name: "Clay".to_string(),
            cost,
            paid_by: "Alice".to_string(),
            category: "Supplies".to_string(),
        }
    }

    async fn role_of(store: &Store, id: &str) -> Role {
        store.get_profile(id).await.unwrap().unwrap().role
    }

    #[tokio::test]
    async fn test_class_types_are_admin_only() {
        let store = seeded().await;
        let config = test_config();
        let add = || ClassTypeCommand::Add {
            name: "Wheel".to_string(),
            cost_per_person: 15.0,
        };

        assert!(handle_class_type_command(add(), &cli(&store, &config, None)).await.is_err());
        let err = handle_class_type_command(add(), &cli(&store, &config, Some("u1")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Admin role required"));
        assert!(store.list_class_types().await.unwrap().is_empty());

        handle_class_type_command(add(), &cli(&store, &config, Some("admin")))
            .await
            .unwrap();
        let id = store.list_class_types().await.unwrap()[0].id.unwrap();

        let delete = ClassTypeCommand::Delete { id };
        assert!(
            handle_class_type_command(delete, &cli(&store, &config, Some("u1")))
                .await
                .is_err()
        );
        assert_eq!(store.list_class_types().await.unwrap().len(), 1);

        let delete = ClassTypeCommand::Delete { id };
        handle_class_type_command(delete, &cli(&store, &config, Some("admin")))
            .await
            .unwrap();
        assert!(store.list_class_types().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_role_requires_admin() {
        let store = seeded().await;
        let config = test_config();
        let promote = || ProfileCommand::SetRole {
            id: "u2".to_string(),
            role: Role::Admin,
        };

        assert!(
            handle_profile_command(promote(), &cli(&store, &config, Some("u1")))
                .await
                .is_err()
        );
        assert!(handle_profile_command(promote(), &cli(&store, &config, None)).await.is_err());
        assert_eq!(role_of(&store, "u2").await, Role::User);

        handle_profile_command(promote(), &cli(&store, &config, Some("admin")))
            .await
            .unwrap();
        assert_eq!(role_of(&store, "u2").await, Role::Admin);
    }

    #[tokio::test]
    async fn test_first_admin_needs_no_user() {
        let store = Store::open_in_memory().await.unwrap();
        let config = test_config();

        handle_profile_command(profile_add("owner", Some(Role::Admin)), &cli(&store, &config, None))
            .await
            .unwrap();
        assert_eq!(role_of(&store, "owner").await, Role::Admin);

        // once an admin exists, only an admin can create another
        let second = || profile_add("second", Some(Role::Admin));
        assert!(handle_profile_command(second(), &cli(&store, &config, None)).await.is_err());
        assert!(store.get_profile("second").await.unwrap().is_none());

        handle_profile_command(second(), &cli(&store, &config, Some("owner")))
            .await
            .unwrap();
        assert_eq!(role_of(&store, "second").await, Role::Admin);

        // plain users can still be added without acting as anyone
        handle_profile_command(profile_add("newcomer", None), &cli(&store, &config, None))
            .await
            .unwrap();
        assert_eq!(role_of(&store, "newcomer").await, Role::User);
    }

    #[tokio::test]
    async fn test_profile_overwrite_keeps_roles_guarded() {
        let store = seeded().await;
        let config = test_config();

        // demoting the admin by re-adding it
        let demote = || profile_add("admin", Some(Role::User));
        assert!(handle_profile_command(demote(), &cli(&store, &config, None)).await.is_err());
        assert!(handle_profile_command(demote(), &cli(&store, &config, Some("u1"))).await.is_err());
        assert_eq!(role_of(&store, "admin").await, Role::Admin);

        // editing someone else's profile
        let other = profile_add("u2", None);
        assert!(handle_profile_command(other, &cli(&store, &config, Some("u1"))).await.is_err());
        assert_eq!(store.get_profile("u2").await.unwrap().unwrap().full_name, "u2 name");

        // self-promotion
        let promote = profile_add("u1", Some(Role::Admin));
        assert!(handle_profile_command(promote, &cli(&store, &config, Some("u1"))).await.is_err());
        assert_eq!(role_of(&store, "u1").await, Role::User);

        // own edit without --role keeps the role
        handle_profile_command(profile_add("u1", None), &cli(&store, &config, Some("u1")))
            .await
            .unwrap();
        let saved = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(saved.full_name, "Renamed");
        assert_eq!(saved.role, Role::User);

        // an admin re-saving itself stays admin
        handle_profile_command(profile_add("admin", None), &cli(&store, &config, Some("admin")))
            .await
            .unwrap();
        assert_eq!(role_of(&store, "admin").await, Role::Admin);
    }

    #[tokio::test]
    async fn test_invite_requires_admin_and_functions() {
        let store = seeded().await;
        let invite = || ProfileCommand::Invite { id: "u2".to_string() };

        let config = test_config();
        assert!(handle_profile_command(invite(), &cli(&store, &config, Some("u1"))).await.is_err());
        let err = handle_profile_command(invite(), &cli(&store, &config, Some("admin")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("[functions]"));

        let (base_url, captured) = notify::tests::spawn_function(axum::http::StatusCode::OK).await;
        let mut config = test_config();
        config.functions = Some(notify::tests::functions(base_url));

        handle_profile_command(invite(), &cli(&store, &config, Some("admin")))
            .await
            .unwrap();
        let calls = captured.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.to, "u2@example.com");
        assert!(calls[0].1.link.ends_with("/login"));
    }

    #[tokio::test]
    async fn test_expense_update_and_delete_need_owner_or_admin() {
        let store = seeded().await;
        let config = test_config();
        let id = store
            .add_expense(&expense("u1", "2025-01", "Supplies", "Alice", 10.0))
            .await
            .unwrap();

        let update = || ExpenseCommand::Update {
            id,
            fields: expense_fields(25.0),
        };
        assert!(handle_expense_command(update(), &cli(&store, &config, Some("u2"))).await.is_err());
        let delete = || ExpenseCommand::Delete { id };
        assert!(handle_expense_command(delete(), &cli(&store, &config, Some("u2"))).await.is_err());
        assert!(handle_expense_command(delete(), &cli(&store, &config, None)).await.is_err());
        assert_eq!(store.get_expense(id).await.unwrap().unwrap().cost, 10.0);

        handle_expense_command(update(), &cli(&store, &config, Some("u1")))
            .await
            .unwrap();
        let updated = store.get_expense(id).await.unwrap().unwrap();
        assert_eq!(updated.cost, 25.0);
        assert_eq!(updated.user_id, "u1");

        handle_expense_command(delete(), &cli(&store, &config, Some("admin")))
            .await
            .unwrap();
        assert!(store.get_expense(id).await.unwrap().is_none());

        // a missing record is reported, not an error
        handle_expense_command(delete(), &cli(&store, &config, Some("u2")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_income_delete_needs_owner_or_admin() {
        let store = seeded().await;
        let config = test_config();
        let id = store
            .add_income(&income("admin", "2025-02-01", "Wheel", 4, 200.0))
            .await
            .unwrap();

        let delete = || IncomeCommand::Delete { id };
        assert!(handle_income_command(delete(), &cli(&store, &config, Some("u1"))).await.is_err());
        assert!(store.get_income(id).await.unwrap().is_some());

        handle_income_command(delete(), &cli(&store, &config, Some("admin")))
            .await
            .unwrap();
        assert!(store.get_income(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_document_delete_needs_uploader_or_admin() {
        let store = seeded().await;
        let config = test_config();
        let id = store
            .add_document(&Document {
                id: None,
                file_name: "receipt.pdf".to_string(),
                file_url: "https://files.example.com/receipt.pdf".to_string(),
                file_size: 100,
                file_type: "application/pdf".to_string(),
                uploaded_by: "u1".to_string(),
                document_type: "receipt".to_string(),
                link: DocumentLink::Expense(1),
            })
            .await
            .unwrap();

        let delete = || DocumentCommand::Delete { id };
        assert!(
            handle_document_command(delete(), &cli(&store, &config, Some("u2")))
                .await
                .is_err()
        );
        assert!(store.get_document(id).await.unwrap().is_some());

        handle_document_command(delete(), &cli(&store, &config, Some("u1")))
            .await
            .unwrap();
        assert!(store.get_document(id).await.unwrap().is_none());
    }
}
