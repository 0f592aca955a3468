//! Workshop expense records
//!
//! Expenses are stored in the database and managed via the CLI or the REST API.
//! The `month` column is canonically `YYYY-MM`; older rows may still carry a bare
//! month name, which is resolved against an explicit year (see [`YearMonth::parse`]).

use anyhow::Result;
use chrono::{Datelike, Month, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::money;

/// Expense entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Database ID (None for expenses not yet saved)
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub month: String,
    pub name: String,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub cost: f64,
    #[serde(default)]
    pub who_paid: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Fields accepted when creating or overwriting an expense
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseInput {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "money::deserialize_amount")]
    pub cost: f64,
    #[serde(default)]
    pub who_paid: String,
    #[serde(default)]
    pub category: String,
}

impl ExpenseRecord {
    /// Calendar month of the expense.
    ///
    /// Bare month names take the year of `created_at`, falling back to `reference_year`.
    pub fn period(&self, reference_year: i32) -> Option<YearMonth> {
        let year = self.created_at.map(|c| c.year()).unwrap_or(reference_year);
        YearMonth::parse(&self.month, year)
    }

    /// Date used for ledger ordering and date-range filters
    pub fn transaction_date(&self, reference_year: i32) -> Option<NaiveDate> {
        self.created_at
            .map(|c| c.date())
            .or_else(|| self.period(reference_year).and_then(|p| p.first_day()))
    }
}

/// An explicit calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Parse `YYYY-MM`, `YYYY-MM-DD`, `March 2025`, `Mar 2025`, or a bare `March`.
    ///
    /// A bare month name uses `fallback_year`.
    pub fn parse(text: &str, fallback_year: i32) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Some(Self::from_date(date));
        }

        if let Some((year, month)) = text.split_once('-') {
            if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
                return Self::new(year, month);
            }
        }

        let mut words = text.split_whitespace().map(|w| w.trim_end_matches(','));
        let month: Month = words.next()?.parse().ok()?;
        let year = match words.next() {
            Some(y) => y.parse::<i32>().ok()?,
            None => fallback_year,
        };
        if words.next().is_some() {
            return None;
        }
        Self::new(year, month.number_from_month())
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Load expenses from a CSV file (for importing/migration)
pub fn load_from_csv(path: &Path) -> Result<Vec<ExpenseRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut expenses = Vec::new();
    for result in rdr.deserialize() {
        let mut expense: ExpenseRecord = result?;
        expense.id = None; // CSV imports don't have IDs
        expenses.push(expense);
    }
    Ok(expenses)
}

/// Export expenses to CSV (for backup)
pub fn export_to_csv(expenses: &[ExpenseRecord], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for expense in expenses {
        wtr.serialize(expense)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Get total expenses
pub fn total_expenses(expenses: &[ExpenseRecord]) -> f64 {
    expenses.iter().map(|e| money::sanitize(e.cost)).sum()
}
