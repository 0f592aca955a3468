//! Contributor ledger: who paid what
//!
//! Expenses are attributed to their `who_paid` name and every income to
//! "Company Revenue". Filters apply in a fixed order: date range and search on
//! individual transactions, then the minimum total on the grouped result.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::aggregate;
use crate::constants;
use crate::expenses::ExpenseRecord;
use crate::incomes::IncomeRecord;
use crate::money;

/// One payer's accumulated transactions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub name: String,
    pub total: f64,
    pub expense_count: usize,
    pub income_count: usize,
    pub average: f64,
    pub last_transaction: Option<NaiveDate>,
}

impl Contributor {
    pub fn transaction_count(&self) -> usize {
        self.expense_count + self.income_count
    }
}

/// Optional ledger filters (all inclusive)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LedgerFilter {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub min_total: Option<f64>,
}

impl LedgerFilter {
    fn has_date_range(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    fn in_range(&self, date: Option<NaiveDate>) -> bool {
        if !self.has_date_range() {
            return true;
        }
        // Undated transactions cannot satisfy a range
        let Some(date) = date else {
            return false;
        };
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortField {
    Name,
    #[default]
    Total,
    Count,
    Average,
    LastTransaction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// A single expense or income, flattened for filtering
struct Transaction<'a> {
    payer: String,
    record_name: &'a str,
    amount: f64,
    date: Option<NaiveDate>,
    is_income: bool,
}

/// Build the filtered, sorted contributor ledger
pub fn build_ledger(
    expenses: &[ExpenseRecord],
    incomes: &[IncomeRecord],
    filter: &LedgerFilter,
    sort: SortField,
    direction: SortDirection,
    reference_year: i32,
) -> Vec<Contributor> {
    let transactions = expenses
        .iter()
        .map(|e| Transaction {
            payer: match e.who_paid.trim() {
                "" => constants::UNKNOWN.to_string(),
                name => name.to_string(),
            },
            record_name: &e.name,
            amount: money::sanitize(e.cost),
            date: e.transaction_date(reference_year),
            is_income: false,
        })
        .chain(incomes.iter().map(|i| Transaction {
            payer: constants::COMPANY_REVENUE.to_string(),
            record_name: &i.name,
            amount: money::sanitize(i.payment),
            date: i.date,
            is_income: true,
        }));

    let search = filter.search_term();
    let mut ledger: Vec<Contributor> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tx in transactions {
        if !filter.in_range(tx.date) {
            continue;
        }
        if let Some(term) = &search {
            let matches = tx.payer.to_lowercase().contains(term)
                || tx.record_name.to_lowercase().contains(term);
            if !matches {
                continue;
            }
        }

        let slot = *index.entry(tx.payer.clone()).or_insert_with(|| {
            ledger.push(Contributor {
                name: tx.payer.clone(),
                total: 0.0,
                expense_count: 0,
                income_count: 0,
                average: 0.0,
                last_transaction: None,
            });
            ledger.len() - 1
        });

        let entry = &mut ledger[slot];
        entry.total += tx.amount;
        if tx.is_income {
            entry.income_count += 1;
        } else {
            entry.expense_count += 1;
        }
        entry.last_transaction = entry.last_transaction.max(tx.date);
    }

    for entry in &mut ledger {
        entry.average = aggregate::average(entry.total, entry.transaction_count());
    }

    if let Some(min_total) = filter.min_total {
        ledger.retain(|c| c.total >= min_total);
    }

    sort_ledger(&mut ledger, sort, direction);
    ledger
}

/// Sort by `field` in `direction`; ties always by name ascending
pub fn sort_ledger(ledger: &mut [Contributor], field: SortField, direction: SortDirection) {
    ledger.sort_by(|a, b| {
        let primary = match field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Total => a.total.total_cmp(&b.total),
            SortField::Count => a.transaction_count().cmp(&b.transaction_count()),
            SortField::Average => a.average.total_cmp(&b.average),
            SortField::LastTransaction => a.last_transaction.cmp(&b.last_transaction),
        };
        let primary = match direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        match primary {
            Ordering::Equal => a.name.cmp(&b.name),
            other => other,
        }
    });
}
