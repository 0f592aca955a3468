//! Supporting document metadata
//!
//! File bytes live in external object storage; only the metadata and the
//! entity the document belongs to are tracked here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Document entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: Option<i64>,
    pub file_name: String,
    pub file_url: String,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub uploaded_by: String,
    #[serde(default)]
    pub document_type: String,
    #[serde(default)]
    pub link: DocumentLink,
}

/// The record a document supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DocumentLink {
    Income(i64),
    Expense(i64),
    Workshop(i64),
    Client(i64),
    #[default]
    None,
}

impl DocumentLink {
    /// Rebuild a link from its stored (kind, id) columns
    pub fn from_parts(kind: Option<&str>, id: Option<i64>) -> Self {
        match (kind, id) {
            (Some("income"), Some(id)) => Self::Income(id),
            (Some("expense"), Some(id)) => Self::Expense(id),
            (Some("workshop"), Some(id)) => Self::Workshop(id),
            (Some("client"), Some(id)) => Self::Client(id),
            _ => Self::None,
        }
    }

    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Self::Income(_) => Some("income"),
            Self::Expense(_) => Some("expense"),
            Self::Workshop(_) => Some("workshop"),
            Self::Client(_) => Some("client"),
            Self::None => None,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Income(id) | Self::Expense(id) | Self::Workshop(id) | Self::Client(id) => {
                Some(*id)
            }
            Self::None => None,
        }
    }
}

impl fmt::Display for DocumentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind(), self.id()) {
            (Some(kind), Some(id)) => write!(f, "{kind} #{id}"),
            _ => write!(f, "-"),
        }
    }
}

/// Human-readable file size (`512 B`, `1.5 KB`, `2.0 MB`)
pub fn format_file_size(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes.max(0));
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}
