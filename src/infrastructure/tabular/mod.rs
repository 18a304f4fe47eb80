// ============================================================
// TABULAR INFRASTRUCTURE LAYER
// ============================================================
// CSV/XLSX decoding into header + rows

mod csv_parser;
mod sheet;
mod xlsx_parser;

pub use csv_parser::CsvParser;
pub use sheet::SheetBuilder;
pub use xlsx_parser::XlsxParser;

use encoding_rs::Encoding;
use tracing::{debug, info};

use crate::domain::error::{AppError, Result};
use crate::domain::import::{ParseResult, SourceFormat};

/// Entry point of the parse stage
#[derive(Debug, Clone)]
pub struct TabularParser {
    fallback_encoding: &'static Encoding,
    max_rows: usize,
}

impl Default for TabularParser {
    fn default() -> Self {
        Self {
            fallback_encoding: encoding_rs::WINDOWS_1255,
            max_rows: 10_000,
        }
    }
}

impl TabularParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Legacy encoding tried when the bytes are neither BOM-marked nor UTF-8
    pub fn with_fallback_encoding(mut self, label: &str) -> Result<Self> {
        self.fallback_encoding = Encoding::for_label(label.as_bytes()).ok_or_else(|| {
            AppError::ConfigError(format!("Unknown encoding label: {}", label))
        })?;
        Ok(self)
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Parse an uploaded file. Only structurally unreadable input is an error.
    pub fn parse(&self, file: &[u8], format: SourceFormat) -> Result<ParseResult> {
        debug!(bytes = file.len(), ?format, "Parsing uploaded file");

        let grid = match format {
            SourceFormat::Csv => {
                let parser = CsvParser::new().with_fallback_encoding(self.fallback_encoding);
                parser.read_grid(file)?
            }
            SourceFormat::Xlsx => XlsxParser::new().read_grid(file)?,
        };

        let result = SheetBuilder::new(self.max_rows).build(grid.rows, grid.warnings)?;

        info!(
            headers = result.headers.len(),
            rows = result.rows.len(),
            warnings = result.warnings.len(),
            "Parsed import file"
        );
        Ok(result)
    }
}

/// Raw cells before header detection
#[derive(Debug, Default)]
pub struct RawGrid {
    pub rows: Vec<Vec<String>>,
    pub warnings: Vec<String>,
}
