//! SQLite storage for workshop records
//!
//! Stands in for the hosted database: incomes, expenses, profiles, class types,
//! clients and document metadata. All queries are plain passthroughs; the
//! aggregation happens in memory after fetching.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};
use std::path::Path;
use tracing::info;

use crate::catalog::{ClassType, Client};
use crate::constants;
use crate::documents::{Document, DocumentLink};
use crate::expenses::ExpenseRecord;
use crate::incomes::IncomeRecord;
use crate::money;
use crate::profiles::{Profile, Role, Scope};

/// Store database wrapper
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

/// Row type for incomes query
#[derive(FromRow)]
struct IncomeRow {
    id: i64,
    user_id: String,
    date: Option<String>,
    platform: Option<String>,
    class_type: Option<String>,
    guest_count: Option<i64>,
    payment: Option<f64>,
    shipping_cost: Option<f64>,
    cost_per_guest: Option<f64>,
    name: Option<String>,
}

/// Row type for expenses query
#[derive(FromRow)]
struct ExpenseRow {
    id: i64,
    user_id: String,
    month: Option<String>,
    name: String,
    cost: Option<f64>,
    who_paid: Option<String>,
    category: Option<String>,
    created_at: Option<String>,
}

/// Row type for profiles query
#[derive(FromRow)]
struct ProfileRow {
    id: String,
    full_name: Option<String>,
    username: Option<String>,
    role: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
    avatar_url: Option<String>,
}

/// Row type for class types query
#[derive(FromRow)]
struct ClassTypeRow {
    id: i64,
    name: String,
    cost_per_person: Option<f64>,
}

/// Row type for documents query
#[derive(FromRow)]
struct DocumentRow {
    id: i64,
    file_name: String,
    file_url: String,
    file_size: Option<i64>,
    file_type: Option<String>,
    uploaded_by: Option<String>,
    document_type: Option<String>,
    entity_kind: Option<String>,
    entity_id: Option<i64>,
}

/// Row type for clients query
#[derive(FromRow)]
struct ClientRow {
    id: i64,
    full_name: String,
    email: Option<String>,
    company: Option<String>,
    total_spent: Option<f64>,
    total_sessions: Option<i64>,
    is_active: bool,
}

const INCOME_COLUMNS: &str = "SELECT id, user_id, date, platform, class_type, guest_count,
        payment, shipping_cost, cost_per_guest, name
     FROM incomes";

const EXPENSE_COLUMNS: &str = "SELECT id, user_id, month, name, cost, who_paid, category, created_at
     FROM expenses";

impl Store {
    /// Open or create the store database
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // SQLx requires the file to exist for SQLite
        if !path.exists() {
            std::fs::File::create(path)?;
        }

        let url = format!("sqlite:{}", path.display());
        let pool = SqlitePool::connect(&url)
            .await
            .context("Failed to open store database")?;

        // WAL lets the server and CLI read while the other writes
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;
        sqlx::query(&format!(
            "PRAGMA busy_timeout={}",
            constants::STORE_BUSY_TIMEOUT_MS
        ))
        .execute(&pool)
        .await?;

        let store = Self { pool };
        store.init_schema().await?;
        info!(path = %path.display(), "store opened");

        Ok(store)
    }

    /// Open a private in-memory store (single connection so every query sees the same database)
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory store")?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                full_name TEXT,
                username TEXT,
                role TEXT NOT NULL DEFAULT 'user',
                email TEXT,
                phone_number TEXT,
                avatar_url TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            -- Admin-managed lookup, referenced by name from incomes
            CREATE TABLE IF NOT EXISTS class_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE,
                cost_per_person REAL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            -- One row per workshop; total_cost and profit are derived on read
            CREATE TABLE IF NOT EXISTS incomes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                date TEXT,
                platform TEXT,
                class_type TEXT,
                guest_count INTEGER,
                payment REAL,
                shipping_cost REAL,
                cost_per_guest REAL,
                total_cost REAL,
                profit REAL,
                name TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                month TEXT,
                name TEXT NOT NULL,
                cost REAL,
                who_paid TEXT,
                category TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            -- Metadata only; file bytes live in object storage
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_name TEXT NOT NULL,
                file_url TEXT NOT NULL,
                file_size INTEGER,
                file_type TEXT,
                uploaded_by TEXT,
                document_type TEXT,
                entity_kind TEXT,
                entity_id INTEGER,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                full_name TEXT NOT NULL,
                email TEXT,
                company TEXT,
                total_spent REAL,
                total_sessions INTEGER,
                is_active INTEGER NOT NULL DEFAULT 1
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_incomes_user ON incomes(user_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_expenses_user ON expenses(user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Incomes
    // =========================================================================

    /// Get incomes visible to `scope`, oldest first
    pub async fn list_incomes(&self, scope: &Scope) -> Result<Vec<IncomeRecord>> {
        let rows: Vec<IncomeRow> = match scope.user_filter() {
            Some(user_id) => {
                sqlx::query_as(&format!(
                    "{INCOME_COLUMNS} WHERE user_id = ? ORDER BY date, id"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("{INCOME_COLUMNS} ORDER BY date, id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(row_to_income).collect())
    }

    /// Get one income by ID
    pub async fn get_income(&self, id: i64) -> Result<Option<IncomeRecord>> {
        let row: Option<IncomeRow> = sqlx::query_as(&format!("{INCOME_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(row_to_income))
    }

    /// Add a new income, returns the ID
    pub async fn add_income(&self, income: &IncomeRecord) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO incomes
             (user_id, date, platform, class_type, guest_count, payment,
              shipping_cost, cost_per_guest, total_cost, profit, name)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&income.user_id)
        .bind(income.date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(&income.platform)
        .bind(&income.class_type)
        .bind(income.guest_count)
        .bind(income.payment)
        .bind(income.shipping_cost)
        .bind(income.cost_per_guest)
        .bind(income.total_cost)
        .bind(income.profit)
        .bind(&income.name)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Overwrite every field of an income, returns false when the ID is unknown
    pub async fn update_income(&self, id: i64, income: &IncomeRecord) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE incomes
             SET user_id = ?, date = ?, platform = ?, class_type = ?, guest_count = ?,
                 payment = ?, shipping_cost = ?, cost_per_guest = ?, total_cost = ?,
                 profit = ?, name = ?
             WHERE id = ?",
        )
        .bind(&income.user_id)
        .bind(income.date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(&income.platform)
        .bind(&income.class_type)
        .bind(income.guest_count)
        .bind(income.payment)
        .bind(income.shipping_cost)
        .bind(income.cost_per_guest)
        .bind(income.total_cost)
        .bind(income.profit)
        .bind(&income.name)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an income by ID
    pub async fn delete_income(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM incomes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    /// Get expenses visible to `scope`
    pub async fn list_expenses(&self, scope: &Scope) -> Result<Vec<ExpenseRecord>> {
        let rows: Vec<ExpenseRow> = match scope.user_filter() {
            Some(user_id) => {
                sqlx::query_as(&format!(
                    "{EXPENSE_COLUMNS} WHERE user_id = ? ORDER BY month, id"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("{EXPENSE_COLUMNS} ORDER BY month, id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(row_to_expense).collect())
    }

    /// Get one expense by ID
    pub async fn get_expense(&self, id: i64) -> Result<Option<ExpenseRecord>> {
        let row: Option<ExpenseRow> = sqlx::query_as(&format!("{EXPENSE_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(row_to_expense))
    }

    /// Add a new expense, returns the ID
    pub async fn add_expense(&self, expense: &ExpenseRecord) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO expenses (user_id, month, name, cost, who_paid, category, created_at)
             VALUES (?, ?, ?, ?, ?, ?, COALESCE(?, datetime('now')))",
        )
        .bind(&expense.user_id)
        .bind(&expense.month)
        .bind(&expense.name)
        .bind(expense.cost)
        .bind(&expense.who_paid)
        .bind(&expense.category)
        .bind(
            expense
                .created_at
                .map(|c| c.format(constants::STORE_TIMESTAMP_FORMAT).to_string()),
        )
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Overwrite every field of an expense (except created_at)
    pub async fn update_expense(&self, id: i64, expense: &ExpenseRecord) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE expenses
             SET user_id = ?, month = ?, name = ?, cost = ?, who_paid = ?, category = ?
             WHERE id = ?",
        )
        .bind(&expense.user_id)
        .bind(&expense.month)
        .bind(&expense.name)
        .bind(expense.cost)
        .bind(&expense.who_paid)
        .bind(&expense.category)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an expense by ID
    pub async fn delete_expense(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Import multiple expenses (in a transaction so a bad row imports nothing)
    pub async fn import_expenses(&self, expenses: &[ExpenseRecord]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        for expense in expenses {
            sqlx::query(
                "INSERT INTO expenses (user_id, month, name, cost, who_paid, category, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, COALESCE(?, datetime('now')))",
            )
            .bind(&expense.user_id)
            .bind(&expense.month)
            .bind(&expense.name)
            .bind(expense.cost)
            .bind(&expense.who_paid)
            .bind(&expense.category)
            .bind(
                expense
                    .created_at
                    .map(|c| c.format(constants::STORE_TIMESTAMP_FORMAT).to_string()),
            )
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(expenses.len())
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Get all profiles
    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            "SELECT id, full_name, username, role, email, phone_number, avatar_url
             FROM profiles
             ORDER BY username, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_profile).collect())
    }

    /// Get one profile by ID
    pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT id, full_name, username, role, email, phone_number, avatar_url
             FROM profiles
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_profile))
    }

    /// Insert or overwrite a profile
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            "INSERT INTO profiles (id, full_name, username, role, email, phone_number, avatar_url)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                full_name = excluded.full_name,
                username = excluded.username,
                role = excluded.role,
                email = excluded.email,
                phone_number = excluded.phone_number,
                avatar_url = excluded.avatar_url",
        )
        .bind(&profile.id)
        .bind(&profile.full_name)
        .bind(&profile.username)
        .bind(profile.role.to_string())
        .bind(&profile.email)
        .bind(&profile.phone_number)
        .bind(&profile.avatar_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Change a profile's role
    pub async fn set_role(&self, id: &str, role: Role) -> Result<bool> {
        let result = sqlx::query("UPDATE profiles SET role = ? WHERE id = ?")
            .bind(role.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Class Types
    // =========================================================================

    /// Get all class types
    pub async fn list_class_types(&self) -> Result<Vec<ClassType>> {
        let rows: Vec<ClassTypeRow> =
            sqlx::query_as("SELECT id, name, cost_per_person FROM class_types ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|r| ClassType {
                id: Some(r.id),
                name: r.name,
                cost_per_person: money::sanitize(r.cost_per_person.unwrap_or(0.0)),
            })
            .collect())
    }

    /// Add a class type, returns the ID
    pub async fn add_class_type(&self, class_type: &ClassType) -> Result<i64> {
        let result = sqlx::query("INSERT INTO class_types (name, cost_per_person) VALUES (?, ?)")
            .bind(class_type.name.trim())
            .bind(class_type.cost_per_person)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to add class type '{}'", class_type.name))?;

        Ok(result.last_insert_rowid())
    }

    /// Delete a class type by ID
    pub async fn delete_class_type(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM class_types WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Get documents, optionally only those attached to `link`
    pub async fn list_documents(&self, link: Option<DocumentLink>) -> Result<Vec<Document>> {
        let select = "SELECT id, file_name, file_url, file_size, file_type, uploaded_by,
                    document_type, entity_kind, entity_id
             FROM documents";

        let rows: Vec<DocumentRow> = match link.and_then(|l| l.kind().zip(l.id())) {
            Some((kind, id)) => {
                sqlx::query_as(&format!(
                    "{select} WHERE entity_kind = ? AND entity_id = ? ORDER BY id"
                ))
                .bind(kind)
                .bind(id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("{select} ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(row_to_document).collect())
    }

    /// Get document metadata by ID
    pub async fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let row: Option<DocumentRow> = sqlx::query_as(
            "SELECT id, file_name, file_url, file_size, file_type, uploaded_by,
                    document_type, entity_kind, entity_id
             FROM documents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_document))
    }

    /// Add document metadata, returns the ID
    pub async fn add_document(&self, document: &Document) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO documents
             (file_name, file_url, file_size, file_type, uploaded_by, document_type,
              entity_kind, entity_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&document.file_name)
        .bind(&document.file_url)
        .bind(document.file_size)
        .bind(&document.file_type)
        .bind(&document.uploaded_by)
        .bind(&document.document_type)
        .bind(document.link.kind())
        .bind(document.link.id())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Delete document metadata by ID
    pub async fn delete_document(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// Get all clients
    pub async fn list_clients(&self) -> Result<Vec<Client>> {
        let rows: Vec<ClientRow> = sqlx::query_as(
            "SELECT id, full_name, email, company, total_spent, total_sessions, is_active
             FROM clients
             ORDER BY full_name, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Client {
                id: Some(r.id),
                full_name: r.full_name,
                email: r.email,
                company: r.company,
                total_spent: money::sanitize(r.total_spent.unwrap_or(0.0)),
                total_sessions: r.total_sessions.unwrap_or(0),
                is_active: r.is_active,
            })
            .collect())
    }

    /// Add a client, returns the ID
    pub async fn add_client(&self, client: &Client) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO clients (full_name, email, company, total_spent, total_sessions, is_active)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&client.full_name)
        .bind(&client.email)
        .bind(&client.company)
        .bind(client.total_spent)
        .bind(client.total_sessions)
        .bind(client.is_active)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Close every pooled connection; later queries fail
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get store statistics
    pub async fn stats(&self) -> Result<StoreStats> {
        let incomes: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM incomes")
            .fetch_one(&self.pool)
            .await?;
        let expenses: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM expenses")
            .fetch_one(&self.pool)
            .await?;
        let profiles: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;
        let class_types: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM class_types")
            .fetch_one(&self.pool)
            .await?;
        let documents: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreStats {
            incomes: incomes.0 as u64,
            expenses: expenses.0 as u64,
            profiles: profiles.0 as u64,
            class_types: class_types.0 as u64,
            documents: documents.0 as u64,
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Convert a DocumentRow to a Document
fn row_to_document(r: DocumentRow) -> Document {
    Document {
        id: Some(r.id),
        file_name: r.file_name,
        file_url: r.file_url,
        file_size: r.file_size.unwrap_or(0),
        file_type: r.file_type.unwrap_or_default(),
        uploaded_by: r.uploaded_by.unwrap_or_default(),
        document_type: r.document_type.unwrap_or_default(),
        link: DocumentLink::from_parts(r.entity_kind.as_deref(), r.entity_id),
    }
}

/// Convert an IncomeRow to an IncomeRecord, recomputing derived costs
fn row_to_income(r: IncomeRow) -> IncomeRecord {
    let mut income = IncomeRecord {
        id: Some(r.id),
        user_id: r.user_id,
        date: r
            .date
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        platform: r.platform.unwrap_or_default(),
        class_type: r.class_type.unwrap_or_default(),
        guest_count: r.guest_count.unwrap_or(0),
        payment: r.payment.unwrap_or(0.0),
        shipping_cost: r.shipping_cost.unwrap_or(0.0),
        cost_per_guest: r.cost_per_guest.unwrap_or(0.0),
        total_cost: 0.0,
        profit: 0.0,
        name: r.name.unwrap_or_default(),
    };
    income.recompute();
    income
}

/// Convert an ExpenseRow to an ExpenseRecord
fn row_to_expense(r: ExpenseRow) -> ExpenseRecord {
    ExpenseRecord {
        id: Some(r.id),
        user_id: r.user_id,
        month: r.month.unwrap_or_default(),
        name: r.name,
        cost: money::sanitize(r.cost.unwrap_or(0.0)),
        who_paid: r.who_paid.unwrap_or_default(),
        category: r.category.unwrap_or_default(),
        created_at: r.created_at.and_then(|c| {
            NaiveDateTime::parse_from_str(&c, constants::STORE_TIMESTAMP_FORMAT).ok()
        }),
    }
}

/// Convert a ProfileRow to a Profile (unknown roles fall back to user)
fn row_to_profile(r: ProfileRow) -> Profile {
    Profile {
        id: r.id,
        full_name: r.full_name.unwrap_or_default(),
        username: r.username.unwrap_or_default(),
        role: r
            .role
            .and_then(|role| role.parse().ok())
            .unwrap_or_default(),
        email: r.email.unwrap_or_default(),
        phone_number: r.phone_number,
        avatar_url: r.avatar_url,
    }
}

/// Store statistics
#[derive(Debug)]
pub struct StoreStats {
    pub incomes: u64,
    pub expenses: u64,
    pub profiles: u64,
    pub class_types: u64,
    pub documents: u64,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} incomes, {} expenses, {} profiles, {} class types, {} documents",
            self.incomes, self.expenses, self.profiles, self.class_types, self.documents
        )
    }
}
