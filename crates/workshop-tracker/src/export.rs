//! Export views and their CSV / xlsx / JSON / docx serializations
//!
//! A view is rendered fully in memory before anything touches disk, then
//! written through [`write_atomic`] so a failed export never leaves a partial
//! file behind.

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use csv::{ReaderBuilder, WriterBuilder};
use serde_json::{Map, Value, json};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::constants;
use crate::money;
use crate::ooxml;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown export format '{0}' (expected csv, xlsx, json or docx)")]
    UnknownFormat(String),

    #[error("Unknown report '{0}'")]
    UnknownReport(String),

    #[error("Export contains no table")]
    MissingTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
    Docx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
            Self::Docx => "docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Json => "application/json",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "json" => Ok(Self::Json),
            "docx" | "word" => Ok(Self::Docx),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A typed table cell; text rendering is fixed (USD, en-US dates)
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Currency(f64),
    Number(f64),
    Integer(i64),
    /// Already multiplied by 100; None renders as "-"
    Percent(Option<f64>),
    Date(Option<NaiveDate>),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Human-readable rendering used by CSV and docx
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Currency(v) => money::format_usd(*v),
            Self::Number(v) => format!("{:.1}", money::normalize_zero(money::sanitize(*v))),
            Self::Integer(v) => v.to_string(),
            Self::Percent(Some(p)) => format!("{:.1}%", money::normalize_zero(money::sanitize(*p))),
            Self::Percent(None) => "-".to_string(),
            Self::Date(Some(d)) => d.format(constants::EXPORT_DATE_FORMAT).to_string(),
            Self::Date(None) => String::new(),
        }
    }

    /// JSON value: numbers stay numeric, dates use the export date format
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => json!(s),
            Self::Currency(v) | Self::Number(v) => json!(money::sanitize(*v)),
            Self::Integer(v) => json!(v),
            Self::Percent(p) => p.map_or(Value::Null, |p| json!(money::sanitize(p))),
            Self::Date(d) => d.map_or(Value::Null, |d| {
                json!(d.format(constants::EXPORT_DATE_FORMAT).to_string())
            }),
        }
    }
}

/// Everything an exporter needs, independent of the output format
#[derive(Debug, Clone)]
pub struct ExportView {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    /// (label, value) pairs describing how the data was filtered
    pub filters: Vec<(String, String)>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// (label, value) totals shown above the table
    pub summary: Vec<(String, Cell)>,
}

impl ExportView {
    pub fn exported_at(&self) -> String {
        self.generated_at
            .format(constants::EXPORT_TIMESTAMP_FORMAT)
            .to_string()
    }
}

/// Serialize a view to bytes in the given format
pub fn render(view: &ExportView, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => to_csv(view),
        ExportFormat::Json => to_json(view),
        ExportFormat::Xlsx => ooxml::xlsx(view),
        ExportFormat::Docx => ooxml::docx(view),
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Metadata block, one blank line, then the header and data rows
pub fn to_csv(view: &ExportView) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();

    {
        let mut meta = WriterBuilder::new().flexible(true).from_writer(&mut out);
        meta.write_record(["Report", view.title.as_str()])?;
        meta.write_record(["Exported", view.exported_at().as_str()])?;
        for (name, value) in &view.filters {
            meta.write_record([format!("Filter: {name}"), value.clone()])?;
        }
        for (label, value) in &view.summary {
            meta.write_record([label.clone(), value.display()])?;
        }
        meta.flush()?;
    }

    out.push(b'\n');

    {
        let mut table = WriterBuilder::new().from_writer(&mut out);
        table.write_record(&view.columns)?;
        for row in &view.rows {
            table.write_record(row.iter().map(Cell::display))?;
        }
        table.flush()?;
    }

    Ok(out)
}

/// Header and rows of an exported CSV table (the metadata block is skipped)
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Read back the table section of a CSV produced by [`to_csv`]
pub fn read_csv_table(bytes: &[u8]) -> Result<CsvTable, ExportError> {
    let start = table_start(bytes).ok_or(ExportError::MissingTable)?;

    let mut rdr = ReaderBuilder::new().from_reader(&bytes[start..]);
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    Ok(CsvTable { headers, rows })
}

/// Offset just past the first blank line outside a quoted field
fn table_start(bytes: &[u8]) -> Option<usize> {
    let mut quoted = false;
    let mut line_empty = true;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => {
                // an escaped quote ("") toggles twice
                quoted = !quoted;
                line_empty = false;
            }
            b'\n' if !quoted => {
                if line_empty {
                    return Some(i + 1);
                }
                line_empty = true;
            }
            b'\r' if !quoted => {}
            _ => line_empty = false,
        }
    }
    None
}

// =============================================================================
// JSON
// =============================================================================

pub fn to_json(view: &ExportView) -> Result<Vec<u8>, ExportError> {
    let filters: Map<String, Value> = view
        .filters
        .iter()
        .map(|(k, v)| (k.clone(), json!(v)))
        .collect();
    let totals: Map<String, Value> = view
        .summary
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();
    let summary: Map<String, Value> = view
        .summary
        .iter()
        .map(|(k, v)| (k.clone(), json!(v.display())))
        .collect();
    let data: Vec<Value> = view
        .rows
        .iter()
        .map(|row| {
            let record: Map<String, Value> = view
                .columns
                .iter()
                .zip(row)
                .map(|(column, cell)| (column.clone(), cell.to_json()))
                .collect();
            Value::Object(record)
        })
        .collect();

    let document = json!({
        "exportInfo": {
            "title": view.title,
            "exportedAt": view.exported_at(),
            "filters": filters,
            "totals": totals,
            "recordCount": view.rows.len(),
        },
        "data": data,
        "summary": summary,
    });

    Ok(serde_json::to_vec_pretty(&document)?)
}

// =============================================================================
// Files
// =============================================================================

/// Write via a temporary sibling and rename, removing the temporary file on failure
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    let result = std::fs::write(&tmp, bytes).and_then(|_| std::fs::rename(&tmp, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    Ok(result?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn sample_view() -> ExportView {
        ExportView {
            title: "Expenses by Category".to_string(),
            generated_at: Utc.with_ymd_and_hms(2025, 3, 4, 15, 30, 0).unwrap(),
            filters: vec![("Year".to_string(), "2025".to_string())],
            columns: vec!["Category".to_string(), "Total".to_string(), "Count".to_string()],
            rows: vec![
                vec![Cell::text("Supplies, Clay"), Cell::Currency(1234.5), Cell::Integer(3)],
                vec![Cell::text("Rent \"Studio\""), Cell::Currency(800.0), Cell::Integer(1)],
            ],
            summary: vec![("Total Expenses".to_string(), Cell::Currency(2034.5))],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("word".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat(f)) if f == "pdf"
        ));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Currency(-3.0).display(), "-$3.00");
        assert_eq!(Cell::Percent(None).display(), "-");
        assert_eq!(Cell::Percent(Some(12.345)).display(), "12.3%");
        assert_eq!(Cell::Date(NaiveDate::from_ymd_opt(2025, 1, 9)).display(), "01/09/2025");
        assert_eq!(Cell::Number(f64::NAN).to_json(), json!(0.0));
    }

    #[test]
    fn test_csv_layout() {
        let text = String::from_utf8(to_csv(&sample_view()).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Report,Expenses by Category");
        assert_eq!(lines[1], "Exported,03/04/2025 03:30:00 PM UTC");
        assert_eq!(lines[2], "Filter: Year,2025");
        assert_eq!(lines[3], "Total Expenses,\"$2,034.50\"");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "Category,Total,Count");
        assert_eq!(lines[6], "\"Supplies, Clay\",\"$1,234.50\",3");
        assert_eq!(lines[7], "\"Rent \"\"Studio\"\"\",$800.00,1");
    }

    #[test]
    fn test_csv_round_trip_keys_and_totals() {
        let view = sample_view();
        let table = read_csv_table(&to_csv(&view).unwrap()).unwrap();

        assert_eq!(table.headers, view.columns);
        let total = table.column("Total").unwrap();
        let pairs: Vec<(String, f64)> = table
            .rows
            .iter()
            .map(|r| (r[0].clone(), money::parse_usd(&r[total]).unwrap()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Supplies, Clay".to_string(), 1234.5),
                ("Rent \"Studio\"".to_string(), 800.0),
            ]
        );
    }

    #[test]
    fn test_csv_round_trip_with_multiline_filter() {
        let mut view = sample_view();
        view.filters.push(("Search".to_string(), "ali\n\nce".to_string()));
        view.summary.push(("Note".to_string(), Cell::text("line one\r\n\r\nline two")));

        let table = read_csv_table(&to_csv(&view).unwrap()).unwrap();
        assert_eq!(table.headers, view.columns);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "Supplies, Clay");
    }

    #[test]
    fn test_csv_without_table_section() {
        assert!(matches!(read_csv_table(b"Report,x\n"), Err(ExportError::MissingTable)));
    }

    #[test]
    fn test_json_shape() {
        let bytes = to_json(&sample_view()).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["exportInfo"]["recordCount"], json!(2));
        assert_eq!(value["exportInfo"]["filters"]["Year"], json!("2025"));
        assert_eq!(value["exportInfo"]["totals"]["Total Expenses"], json!(2034.5));
        assert_eq!(value["data"][0]["Category"], json!("Supplies, Clay"));
        assert_eq!(value["data"][0]["Count"], json!(3));
        assert_eq!(value["summary"]["Total Expenses"], json!("$2,034.50"));
        // Pretty-printed
        assert!(String::from_utf8(bytes).unwrap().contains("\n  \"data\""));
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.csv");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_atomic_failure_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        // Renaming a file over a directory fails
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        assert!(write_atomic(&path, b"data").is_err());
        assert!(!dir.path().join(".taken.tmp").exists());
        assert!(path.is_dir());
    }
}
