//! Grouping and summing over fetched records
//!
//! All functions here are pure. Groups come back in first-seen order; callers
//! sort explicitly with [`sort_by_total`] or [`sort_by_key`] so every ordering is
//! deterministic.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::constants;
use crate::expenses::{ExpenseRecord, YearMonth};
use crate::incomes::IncomeRecord;
use crate::money;

/// One group of summed amounts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
    pub count: usize,
}

/// Sum `amount` per distinct `key`, in first-seen order.
///
/// Blank or missing keys are grouped under `missing_label`; non-finite amounts count as 0.
pub fn group_sum<T>(
    records: &[T],
    key: impl Fn(&T) -> Option<String>,
    amount: impl Fn(&T) -> f64,
    missing_label: &str,
) -> Vec<GroupTotal> {
    let mut groups: Vec<GroupTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let label = key(record)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| missing_label.to_string());

        let slot = *index.entry(label.clone()).or_insert_with(|| {
            groups.push(GroupTotal {
                key: label,
                total: 0.0,
                count: 0,
            });
            groups.len() - 1
        });
        groups[slot].total += money::sanitize(amount(record));
        groups[slot].count += 1;
    }

    groups
}

/// Largest total first, ties by key
pub fn sort_by_total(groups: &mut [GroupTotal]) {
    groups.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
}

/// Ascending by key (chronological for `YYYY-MM`)
pub fn sort_by_key(groups: &mut [GroupTotal]) {
    groups.sort_by(|a, b| a.key.cmp(&b.key));
}

/// Sum of every group
pub fn grand_total(groups: &[GroupTotal]) -> f64 {
    groups.iter().map(|g| g.total).sum()
}

// =============================================================================
// Expenses
// =============================================================================

pub fn expenses_by_category(expenses: &[ExpenseRecord]) -> Vec<GroupTotal> {
    group_sum(
        expenses,
        |e| Some(e.category.clone()),
        |e| e.cost,
        constants::UNCATEGORIZED,
    )
}

pub fn expenses_by_payer(expenses: &[ExpenseRecord]) -> Vec<GroupTotal> {
    group_sum(
        expenses,
        |e| Some(e.who_paid.clone()),
        |e| e.cost,
        constants::UNKNOWN,
    )
}

/// Expense totals per `YYYY-MM`, chronological; unparseable months group as "Unknown"
pub fn expenses_by_month(expenses: &[ExpenseRecord], reference_year: i32) -> Vec<GroupTotal> {
    let mut groups = group_sum(
        expenses,
        |e| e.period(reference_year).map(|p| p.to_string()),
        |e| e.cost,
        constants::UNKNOWN,
    );
    sort_by_key(&mut groups);
    groups
}

// =============================================================================
// Incomes
// =============================================================================

/// Payments per booking platform
pub fn income_by_platform(incomes: &[IncomeRecord]) -> Vec<GroupTotal> {
    group_sum(
        incomes,
        |i| Some(i.platform.clone()),
        |i| i.payment,
        constants::UNKNOWN,
    )
}

/// Payments per `YYYY-MM`, chronological
pub fn income_by_month(incomes: &[IncomeRecord]) -> Vec<GroupTotal> {
    let mut groups = group_sum(
        incomes,
        |i| i.date.map(|d| YearMonth::from_date(d).to_string()),
        |i| i.payment,
        constants::UNKNOWN,
    );
    sort_by_key(&mut groups);
    groups
}

/// Per class type workshop figures
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub class_type: String,
    pub workshops: usize,
    pub guests: i64,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub average_guests: f64,
    pub margin_percent: Option<f64>,
}

/// Incomes grouped by class type, in first-seen order
pub fn income_by_class(incomes: &[IncomeRecord]) -> Vec<ClassSummary> {
    let mut classes: Vec<ClassSummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for income in incomes {
        let name = match income.class_type.trim() {
            "" => constants::UNKNOWN.to_string(),
            name => name.to_string(),
        };
        let slot = *index.entry(name.clone()).or_insert_with(|| {
            classes.push(ClassSummary {
                class_type: name,
                workshops: 0,
                guests: 0,
                revenue: 0.0,
                cost: 0.0,
                profit: 0.0,
                average_guests: 0.0,
                margin_percent: None,
            });
            classes.len() - 1
        });

        let class = &mut classes[slot];
        class.workshops += 1;
        class.guests += income.guest_count.max(0);
        class.revenue += money::sanitize(income.payment);
        class.cost += money::sanitize(income.total_cost);
        class.profit += money::sanitize(income.profit);
    }

    for class in &mut classes {
        class.average_guests = average(class.guests as f64, class.workshops);
        class.margin_percent = margin_percent(class.profit, class.revenue);
    }

    classes
}

/// Highest revenue first, ties by class type
pub fn sort_classes_by_revenue(classes: &mut [ClassSummary]) {
    classes.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.class_type.cmp(&b.class_type))
    });
}

// =============================================================================
// Profit & Loss
// =============================================================================

/// One month of the profit & loss table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: YearMonth,
    pub income: f64,
    pub expenses: f64,
    pub profit: f64,
    /// Profit since January of the same year
    pub ytd_profit: f64,
    /// Income change against the previous listed month
    pub growth_percent: Option<f64>,
}

/// Monthly income, expenses and profit, chronological.
///
/// Rows without a resolvable month are left out of the table (they still count in [`totals`]).
pub fn monthly_profit_and_loss(
    incomes: &[IncomeRecord],
    expenses: &[ExpenseRecord],
    reference_year: i32,
) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<YearMonth, (f64, f64)> = BTreeMap::new();

    for income in incomes {
        if let Some(date) = income.date {
            let month = months.entry(YearMonth::from_date(date)).or_default();
            month.0 += money::sanitize(income.payment);
        }
    }
    for expense in expenses {
        if let Some(period) = expense.period(reference_year) {
            months.entry(period).or_default().1 += money::sanitize(expense.cost);
        }
    }

    let mut summaries = Vec::with_capacity(months.len());
    let mut ytd = 0.0;
    let mut current_year = None;
    let mut previous_income: Option<f64> = None;

    for (month, (income, expenses)) in months {
        // Reset YTD at year boundary
        if current_year != Some(month.year) {
            ytd = 0.0;
            current_year = Some(month.year);
        }
        let profit = income - expenses;
        ytd += profit;

        summaries.push(MonthlySummary {
            month,
            income,
            expenses,
            profit,
            ytd_profit: ytd,
            growth_percent: previous_income.and_then(|prev| growth_percent(prev, income)),
        });
        previous_income = Some(income);
    }

    summaries
}

/// Overall totals, serialized the way the summary endpoint returns them
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_profit: f64,
}

pub fn totals(incomes: &[IncomeRecord], expenses: &[ExpenseRecord]) -> Totals {
    let total_income = crate::incomes::total_income(incomes);
    let total_expenses = crate::expenses::total_expenses(expenses);
    Totals {
        total_income,
        total_expenses,
        total_profit: total_income - total_expenses,
    }
}

/// Workshop KPIs across all incomes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopStats {
    pub workshops: usize,
    pub guests: i64,
    pub revenue: f64,
    pub costs: f64,
    pub profit: f64,
    pub average_payment: f64,
    pub average_guests: f64,
    pub margin_percent: Option<f64>,
}

pub fn workshop_stats(incomes: &[IncomeRecord]) -> WorkshopStats {
    let workshops = incomes.len();
    let guests: i64 = incomes.iter().map(|i| i.guest_count.max(0)).sum();
    let revenue: f64 = incomes.iter().map(|i| money::sanitize(i.payment)).sum();
    let costs: f64 = incomes.iter().map(|i| money::sanitize(i.total_cost)).sum();
    let profit: f64 = incomes.iter().map(|i| money::sanitize(i.profit)).sum();

    WorkshopStats {
        workshops,
        guests,
        revenue,
        costs,
        profit,
        average_payment: average(revenue, workshops),
        average_guests: average(guests as f64, workshops),
        margin_percent: margin_percent(profit, revenue),
    }
}

// =============================================================================
// Ratios
// =============================================================================

/// Percent change from `previous` to `current`; None when there is no base
pub fn growth_percent(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() {
        return None;
    }
    Some((current - previous) / previous.abs() * 100.0)
}

/// Profit as a percent of revenue; None when there was no revenue
pub fn margin_percent(profit: f64, revenue: f64) -> Option<f64> {
    if revenue == 0.0 || !revenue.is_finite() {
        return None;
    }
    Some(profit / revenue * 100.0)
}

/// Mean of `count` values summing to `total`, 0 for an empty set
pub fn average(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}
