// ============================================================
// ROW TYPES
// ============================================================
// Parsed spreadsheet content, keyed by verified-unique headers

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Source file format selected by the uploader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    /// Guess the format from a file name extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match extension.as_str() {
            "csv" | "txt" | "tsv" => Some(SourceFormat::Csv),
            "xlsx" | "xlsm" => Some(SourceFormat::Xlsx),
            _ => None,
        }
    }
}

/// A single data row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Position among data rows (0-based)
    pub index: usize,

    /// Physical row number in the source sheet (1-based, header included)
    pub line: usize,

    values: HashMap<String, String>,
}

impl Row {
    /// Build a row from header/value pairs. Headers must already be unique.
    pub fn from_pairs<I, K, V>(index: usize, line: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { index, line, values }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.values.get(header).map(String::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }
}

/// Output of the tabular parser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub warnings: Vec<String>,
}

impl ParseResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
