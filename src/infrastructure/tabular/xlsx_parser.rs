use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};
use chrono::{Days, NaiveDate};

use super::RawGrid;
use crate::domain::error::{AppError, Result};

/// Reads the first worksheet of an XLSX workbook
#[derive(Default)]
pub struct XlsxParser;

impl XlsxParser {
    pub fn new() -> Self {
        Self
    }

    pub fn read_grid(&self, bytes: &[u8]) -> Result<RawGrid> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| AppError::ParseError(format!("Failed to open Excel file: {}", e)))?;

        let mut warnings = Vec::new();
        let sheet_count = workbook.sheet_names().len();
        if sheet_count > 1 {
            warnings.push(format!(
                "workbook has {} sheets, only the first was read",
                sheet_count
            ));
        }

        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range
                .map_err(|e| AppError::ParseError(format!("Failed to read Excel range: {}", e)))?,
            None => return Ok(RawGrid { rows: Vec::new(), warnings }),
        };

        Ok(RawGrid {
            rows: grid_from_range(&range),
            warnings,
        })
    }
}

/// The range starts at the first used cell; leading empty sheet rows are put back
/// so line numbers match the sheet.
fn grid_from_range(range: &Range<Data>) -> Vec<Vec<String>> {
    let leading_rows = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    std::iter::repeat_with(Vec::new)
        .take(leading_rows)
        .chain(range.rows().map(|row| row.iter().map(cell_text).collect()))
        .collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            serial_to_iso_date(serial).unwrap_or_else(|| format_number(serial))
        }
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

/// Whole numbers lose the `.0` so phone numbers stored as numbers stay digit-only
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Excel 1900 date system; serial 1 is 1900-01-01 (with the historical leap-year bug)
fn serial_to_iso_date(serial: f64) -> Option<String> {
    if !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_days(Days::new(serial.floor() as u64))?;
    Some(date.format("%Y-%m-%d").to_string())
}
