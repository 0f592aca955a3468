//! Report views (for export) and console summary

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

use crate::aggregate::{self, GroupTotal};
use crate::contributors::{self, LedgerFilter, SortDirection, SortField};
use crate::export::{Cell, ExportError, ExportFormat, ExportView};
use crate::fetch::Dataset;
use crate::money::{self, normalize_zero};
use crate::present;
use crate::profiles::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Categories,
    Payers,
    Classes,
    Monthly,
    Platforms,
    Contributors,
    Incomes,
    Expenses,
}

impl ReportKind {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Payers => "payers",
            Self::Classes => "classes",
            Self::Monthly => "monthly",
            Self::Platforms => "platforms",
            Self::Contributors => "contributors",
            Self::Incomes => "incomes",
            Self::Expenses => "expenses",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Categories => "Expenses by Category",
            Self::Payers => "Expenses by Payer",
            Self::Classes => "Workshops by Class Type",
            Self::Monthly => "Monthly Profit & Loss",
            Self::Platforms => "Revenue by Platform",
            Self::Contributors => "Contributors",
            Self::Incomes => "Income Ledger",
            Self::Expenses => "Expense Ledger",
        }
    }
}

impl FromStr for ReportKind {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s.trim(), true)
            .map_err(|_| ExportError::UnknownReport(s.trim().to_string()))
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Options shared by every report
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Year assumed for legacy bare month names
    pub reference_year: i32,
    /// Restrict to one calendar year
    pub year: Option<i32>,
    pub ledger: LedgerFilter,
    pub sort: SortField,
    pub direction: SortDirection,
}

/// Keep only records falling in `year`
pub fn filter_year(dataset: &Dataset, year: i32, reference_year: i32) -> Dataset {
    Dataset {
        incomes: dataset
            .incomes
            .iter()
            .filter(|i| i.date.is_some_and(|d| d.year() == year))
            .cloned()
            .collect(),
        expenses: dataset
            .expenses
            .iter()
            .filter(|e| e.period(reference_year).is_some_and(|p| p.year == year))
            .cloned()
            .collect(),
        class_types: dataset.class_types.clone(),
    }
}

/// Download file name, e.g. `workshop-categories-2025-03-04.csv`
pub fn file_name(kind: ReportKind, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "workshop-{}-{}.{}",
        kind.slug(),
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Build the export view for a report
pub fn build_view(
    kind: ReportKind,
    dataset: &Dataset,
    scope: &Scope,
    options: &ReportOptions,
    generated_at: DateTime<Utc>,
) -> ExportView {
    let filtered;
    let data = match options.year {
        Some(year) => {
            filtered = filter_year(dataset, year, options.reference_year);
            &filtered
        }
        None => dataset,
    };

    let mut filters = vec![(
        "Scope".to_string(),
        match scope {
            Scope::All => "All users".to_string(),
            Scope::Own(user_id) => user_id.clone(),
        },
    )];
    if let Some(year) = options.year {
        filters.push(("Year".to_string(), year.to_string()));
    }

    let (columns, rows, summary) = match kind {
        ReportKind::Categories => group_table(
            "Category",
            aggregate::expenses_by_category(&data.expenses),
            "Total Expenses",
        ),
        ReportKind::Payers => group_table(
            "Paid By",
            aggregate::expenses_by_payer(&data.expenses),
            "Total Expenses",
        ),
        ReportKind::Platforms => group_table(
            "Platform",
            aggregate::income_by_platform(&data.incomes),
            "Total Revenue",
        ),
        ReportKind::Classes => classes_table(data),
        ReportKind::Monthly => monthly_table(data, options.reference_year),
        ReportKind::Contributors => {
            push_ledger_filters(&mut filters, options);
            contributors_table(data, options)
        }
        ReportKind::Incomes => incomes_table(data),
        ReportKind::Expenses => expenses_table(data, options.reference_year),
    };

    ExportView {
        title: kind.title().to_string(),
        generated_at,
        filters,
        columns: columns.into_iter().map(str::to_string).collect(),
        rows,
        summary,
    }
}

type Table = (Vec<&'static str>, Vec<Vec<Cell>>, Vec<(String, Cell)>);

fn group_table(label: &'static str, mut groups: Vec<GroupTotal>, total_label: &str) -> Table {
    aggregate::sort_by_total(&mut groups);
    let total = aggregate::grand_total(&groups);

    let rows = groups
        .into_iter()
        .map(|g| {
            let share = present::percent_share(g.total, total);
            vec![
                Cell::Text(g.key),
                Cell::Currency(g.total),
                Cell::Integer(g.count as i64),
                Cell::Percent(Some(share as f64)),
            ]
        })
        .collect();

    (
        vec![label, "Total", "Count", "Share"],
        rows,
        vec![(total_label.to_string(), Cell::Currency(total))],
    )
}

fn classes_table(data: &Dataset) -> Table {
    let mut classes = aggregate::income_by_class(&data.incomes);
    aggregate::sort_classes_by_revenue(&mut classes);
    let stats = aggregate::workshop_stats(&data.incomes);

    let rows = classes
        .into_iter()
        .map(|c| {
            vec![
                Cell::Text(c.class_type),
                Cell::Integer(c.workshops as i64),
                Cell::Integer(c.guests),
                Cell::Currency(c.revenue),
                Cell::Currency(c.cost),
                Cell::Currency(c.profit),
                Cell::Number(c.average_guests),
                Cell::Percent(c.margin_percent),
            ]
        })
        .collect();

    (
        vec![
            "Class Type",
            "Workshops",
            "Guests",
            "Revenue",
            "Cost",
            "Profit",
            "Avg Guests",
            "Margin",
        ],
        rows,
        vec![
            ("Workshops".to_string(), Cell::Integer(stats.workshops as i64)),
            ("Guests".to_string(), Cell::Integer(stats.guests)),
            ("Total Revenue".to_string(), Cell::Currency(stats.revenue)),
            ("Total Profit".to_string(), Cell::Currency(stats.profit)),
            ("Margin".to_string(), Cell::Percent(stats.margin_percent)),
        ],
    )
}

fn monthly_table(data: &Dataset, reference_year: i32) -> Table {
    let months = aggregate::monthly_profit_and_loss(&data.incomes, &data.expenses, reference_year);
    let totals = aggregate::totals(&data.incomes, &data.expenses);

    let rows = months
        .into_iter()
        .map(|m| {
            vec![
                Cell::Text(m.month.to_string()),
                Cell::Currency(m.income),
                Cell::Currency(m.expenses),
                Cell::Currency(m.profit),
                Cell::Currency(m.ytd_profit),
                Cell::Percent(m.growth_percent),
            ]
        })
        .collect();

    (
        vec!["Month", "Income", "Expenses", "Profit", "YTD Profit", "Income Growth"],
        rows,
        totals_summary(&totals),
    )
}

fn contributors_table(data: &Dataset, options: &ReportOptions) -> Table {
    let ledger = contributors::build_ledger(
        &data.expenses,
        &data.incomes,
        &options.ledger,
        options.sort,
        options.direction,
        options.reference_year,
    );
    let total: f64 = ledger.iter().map(|c| c.total).sum();
    let count = ledger.len();

    let rows = ledger
        .into_iter()
        .map(|c| {
            vec![
                Cell::Text(c.name),
                Cell::Currency(c.total),
                Cell::Integer(c.expense_count as i64),
                Cell::Integer(c.income_count as i64),
                Cell::Currency(c.average),
                Cell::Date(c.last_transaction),
            ]
        })
        .collect();

    (
        vec!["Name", "Total", "Expenses", "Incomes", "Average", "Last Transaction"],
        rows,
        vec![
            ("Contributors".to_string(), Cell::Integer(count as i64)),
            ("Total".to_string(), Cell::Currency(total)),
        ],
    )
}

fn push_ledger_filters(filters: &mut Vec<(String, String)>, options: &ReportOptions) {
    let ledger = &options.ledger;
    if let Some(from) = ledger.from {
        filters.push(("From".to_string(), Cell::Date(Some(from)).display()));
    }
    if let Some(to) = ledger.to {
        filters.push(("To".to_string(), Cell::Date(Some(to)).display()));
    }
    if let Some(search) = ledger.search.as_deref().filter(|s| !s.trim().is_empty()) {
        filters.push(("Search".to_string(), search.trim().to_string()));
    }
    if let Some(min_total) = ledger.min_total {
        filters.push(("Minimum Total".to_string(), money::format_usd(min_total)));
    }
}

fn incomes_table(data: &Dataset) -> Table {
    let totals = aggregate::totals(&data.incomes, &[]);
    let rows = data
        .incomes
        .iter()
        .map(|i| {
            vec![
                Cell::Date(i.date),
                Cell::Text(i.name.clone()),
                Cell::Text(i.platform.clone()),
                Cell::Text(i.class_type.clone()),
                Cell::Integer(i.guest_count),
                Cell::Currency(i.payment),
                Cell::Currency(i.shipping_cost),
                Cell::Currency(i.cost_per_guest),
                Cell::Currency(i.total_cost),
                Cell::Currency(i.profit),
            ]
        })
        .collect();

    (
        vec![
            "Date",
            "Name",
            "Platform",
            "Class Type",
            "Guests",
            "Payment",
            "Shipping",
            "Cost per Guest",
            "Total Cost",
            "Profit",
        ],
        rows,
        vec![("Total Income".to_string(), Cell::Currency(totals.total_income))],
    )
}

fn expenses_table(data: &Dataset, reference_year: i32) -> Table {
    let total = crate::expenses::total_expenses(&data.expenses);
    let rows = data
        .expenses
        .iter()
        .map(|e| {
            vec![
                Cell::Text(
                    e.period(reference_year)
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| e.month.clone()),
                ),
                Cell::Text(e.name.clone()),
                Cell::Text(e.category.clone()),
                Cell::Text(e.who_paid.clone()),
                Cell::Currency(e.cost),
            ]
        })
        .collect();

    (
        vec!["Month", "Name", "Category", "Paid By", "Cost"],
        rows,
        vec![("Total Expenses".to_string(), Cell::Currency(total))],
    )
}

fn totals_summary(totals: &aggregate::Totals) -> Vec<(String, Cell)> {
    vec![
        ("Total Income".to_string(), Cell::Currency(totals.total_income)),
        ("Total Expenses".to_string(), Cell::Currency(totals.total_expenses)),
        ("Total Profit".to_string(), Cell::Currency(totals.total_profit)),
    ]
}

/// Print summary to console
pub fn print_summary(dataset: &Dataset, year_filter: Option<i32>, reference_year: i32) {
    let filtered;
    let data = match year_filter {
        Some(year) => {
            filtered = filter_year(dataset, year, reference_year);
            &filtered
        }
        None => dataset,
    };

    println!("\n============================================================");
    if let Some(year) = year_filter {
        println!("                 WORKSHOP SUMMARY ({})", year);
    } else {
        println!("                     WORKSHOP SUMMARY");
    }
    println!("============================================================\n");

    let totals = aggregate::totals(&data.incomes, &data.expenses);
    let stats = aggregate::workshop_stats(&data.incomes);

    println!("WORKSHOPS:");
    println!("  Workshops held:     {:>12}", stats.workshops);
    println!("  Guests:             {:>12}", stats.guests);
    println!("  Avg guests:         {:>12.1}", stats.average_guests);
    println!("  Avg payment:        {:>12}", money::format_usd(stats.average_payment));
    println!("  Material costs:     {:>12}", money::format_usd(stats.costs));
    match stats.margin_percent {
        Some(margin) => println!("  Workshop margin:    {:>11.1}%", normalize_zero(margin)),
        None => println!("  Workshop margin:    {:>12}", "-"),
    }

    println!("\nTOP CLASS TYPES (by guests):");
    let popularity = present::popularity(&aggregate::income_by_class(&data.incomes));
    if popularity.is_empty() {
        println!("  (none)");
    }
    for slice in &popularity {
        println!("  {:<20}{:>8} guests {:>5}%", slice.label, slice.value, slice.percent);
    }

    println!("\nTOP EXPENSE CATEGORIES:");
    let categories = present::headline(&aggregate::expenses_by_category(&data.expenses));
    if categories.is_empty() {
        println!("  (none)");
    }
    for slice in &categories {
        println!(
            "  {:<20}{:>14} {:>5}%",
            slice.label,
            money::format_usd(slice.value),
            slice.percent
        );
    }

    println!("\nPROFIT/LOSS:");
    println!("  Total Income:       {:>12}", money::format_usd(totals.total_income));
    println!("  Total Expenses:     {:>12}", money::format_usd(totals.total_expenses));
    println!("  ─────────────────────────────────");
    println!("  Net Profit:         {:>12}", money::format_usd(totals.total_profit));

    println!("============================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{read_csv_table, to_csv};
    use crate::store::tests::{expense, income};
    use chrono::TimeZone;

    fn dataset() -> Dataset {
        Dataset {
            incomes: vec![
                income("u1", "2024-12-07", "Wheel", 4, 200.0),
                income("u1", "2025-01-04", "Glaze", 2, 90.0),
            ],
            expenses: vec![
                expense("u1", "2025-01", "A", "Alice", 10.0),
                expense("u1", "2025-01", "B", "Bob", 5.0),
                expense("u1", "2024-11", "A", "Alice", 3.0),
            ],
            class_types: Vec::new(),
        }
    }

    fn options() -> ReportOptions {
        ReportOptions {
            reference_year: 2025,
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_report_kind_parsing() {
        assert_eq!("Categories".parse::<ReportKind>().unwrap(), ReportKind::Categories);
        assert!(matches!(
            "ledger".parse::<ReportKind>(),
            Err(ExportError::UnknownReport(r)) if r == "ledger"
        ));
    }

    #[test]
    fn test_categories_view_round_trips_through_csv() {
        let view = build_view(ReportKind::Categories, &dataset(), &Scope::All, &options(), now());
        assert_eq!(view.columns, ["Category", "Total", "Count", "Share"]);

        let table = read_csv_table(&to_csv(&view).unwrap()).unwrap();
        let pairs: Vec<(String, f64)> = table
            .rows
            .iter()
            .map(|r| (r[0].clone(), money::parse_usd(&r[1]).unwrap()))
            .collect();
        assert_eq!(pairs, vec![("A".to_string(), 13.0), ("B".to_string(), 5.0)]);
        assert_eq!(table.rows[0][3], "72.0%");
    }

    #[test]
    fn test_year_filter() {
        let options = ReportOptions {
            year: Some(2025),
            ..options()
        };
        let scope = Scope::Own("u1".to_string());
        let view = build_view(ReportKind::Monthly, &dataset(), &scope, &options, now());

        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0][0], Cell::Text("2025-01".to_string()));
        assert_eq!(view.rows[0][3], Cell::Currency(75.0));
        assert!(view.filters.contains(&("Year".to_string(), "2025".to_string())));
        assert!(view.filters.contains(&("Scope".to_string(), "u1".to_string())));
    }

    #[test]
    fn test_contributors_view_lists_filters() {
        let options = ReportOptions {
            ledger: LedgerFilter {
                min_total: Some(15.0),
                ..Default::default()
            },
            ..options()
        };
        let view = build_view(ReportKind::Contributors, &dataset(), &Scope::All, &options, now());

        let names: Vec<_> = view.rows.iter().map(|r| r[0].display()).collect();
        assert_eq!(names, ["Company Revenue"]);
        assert!(view.filters.contains(&("Minimum Total".to_string(), "$15.00".to_string())));
    }

    #[test]
    fn test_contributors_csv_with_multiline_search() {
        let options = ReportOptions {
            ledger: LedgerFilter {
                search: Some("ali\n\nce".to_string()),
                ..Default::default()
            },
            ..options()
        };
        let view = build_view(ReportKind::Contributors, &dataset(), &Scope::All, &options, now());

        let table = read_csv_table(&to_csv(&view).unwrap()).unwrap();
        assert_eq!(table.headers, view.columns);
        assert_eq!(table.rows.len(), view.rows.len());
    }

    #[test]
    fn test_classes_view_sorted_by_revenue() {
        let view = build_view(ReportKind::Classes, &dataset(), &Scope::All, &options(), now());
        assert_eq!(view.rows[0][0], Cell::Text("Wheel".to_string()));
        assert_eq!(view.rows[1][0], Cell::Text("Glaze".to_string()));
    }

    #[test]
    fn test_empty_dataset_views() {
        for kind in [
            ReportKind::Categories,
            ReportKind::Payers,
            ReportKind::Classes,
            ReportKind::Monthly,
            ReportKind::Platforms,
            ReportKind::Contributors,
            ReportKind::Incomes,
            ReportKind::Expenses,
        ] {
            let view = build_view(kind, &Dataset::default(), &Scope::All, &options(), now());
            assert!(view.rows.is_empty(), "{kind} should be empty");
            assert!(!view.columns.is_empty());
        }
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(
            file_name(ReportKind::Monthly, ExportFormat::Xlsx, date),
            "workshop-monthly-2025-03-04.xlsx"
        );
    }
}
