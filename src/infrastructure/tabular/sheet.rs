use std::collections::HashSet;

use crate::domain::error::{AppError, Result};
use crate::domain::import::{ParseResult, Row};

/// Turns a raw cell grid into unique headers plus keyed rows
pub struct SheetBuilder {
    max_rows: usize,
}

impl SheetBuilder {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    pub fn build(&self, grid: Vec<Vec<String>>, mut warnings: Vec<String>) -> Result<ParseResult> {
        // Line numbers are 1-based sheet rows, blank rows included.
        let mut lines = grid
            .into_iter()
            .enumerate()
            .map(|(idx, cells)| (idx + 1, cells))
            .filter(|(_, cells)| !is_blank(cells));

        let Some((_, header_cells)) = lines.next() else {
            warnings.push("sheet is empty".to_string());
            return Ok(ParseResult {
                headers: Vec::new(),
                rows: Vec::new(),
                warnings,
            });
        };

        let headers = unique_headers(&header_cells);
        let mut rows = Vec::new();

        for (line, cells) in lines {
            if rows.len() >= self.max_rows {
                return Err(AppError::ParseError(format!(
                    "File has more than {} data rows",
                    self.max_rows
                )));
            }

            let extra = cells.iter().skip(headers.len()).any(|c| !c.trim().is_empty());
            if extra {
                warnings.push(format!("row {} has extra columns, ignored", line));
            }

            let values = headers.iter().enumerate().map(|(col, header)| {
                let value = cells.get(col).map(|c| c.trim()).unwrap_or("");
                (header.clone(), value.to_string())
            });
            rows.push(Row::from_pairs(rows.len(), line, values));
        }

        if rows.is_empty() {
            warnings.push("no data rows found".to_string());
        }

        Ok(ParseResult {
            headers,
            rows,
            warnings,
        })
    }
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}

/// Trim, name blank headers, suffix duplicates (`Phone`, `Phone_2`, ...).
/// Trailing blank header cells are dropped.
fn unique_headers(cells: &[String]) -> Vec<String> {
    let width = cells
        .iter()
        .rposition(|c| !c.trim().is_empty())
        .map(|pos| pos + 1)
        .unwrap_or(0);

    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(width);

    for (col, cell) in cells.iter().take(width).enumerate() {
        let base = match cell.trim() {
            "" => format!("column_{}", col + 1),
            name => name.to_string(),
        };

        let mut candidate = base.clone();
        let mut suffix = 2;
        while seen.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_first_non_empty_row_is_header() {
        let result = SheetBuilder::new(100)
            .build(grid(&[&["", ""], &["Phone", "Name"], &["050", "Moshe"]]), Vec::new())
            .unwrap();

        assert_eq!(result.headers, vec!["Phone", "Name"]);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].line, 3);
        assert_eq!(result.rows[0].index, 0);
    }

    #[test]
    fn test_duplicate_headers_get_suffix() {
        let headers = unique_headers(&grid(&[&[" Phone ", "Phone", "Phone_2", "", "Phone"]])[0]);
        assert_eq!(headers, vec!["Phone", "Phone_2", "Phone_2_2", "column_4", "Phone_3"]);
    }

    #[test]
    fn test_short_rows_are_padded_and_long_rows_warned() {
        let result = SheetBuilder::new(100)
            .build(
                grid(&[&["Phone", "Name", ""], &["050"], &["051", "Rivka", "extra", ""]]),
                Vec::new(),
            )
            .unwrap();

        assert_eq!(result.headers, vec!["Phone", "Name"]);
        assert_eq!(result.rows[0].get("Name"), Some(""));
        assert_eq!(result.rows[1].get("Name"), Some("Rivka"));
        assert_eq!(result.warnings, vec!["row 3 has extra columns, ignored"]);
    }

    #[test]
    fn test_empty_sheet_is_warning_not_error() {
        let result = SheetBuilder::new(100).build(Vec::new(), Vec::new()).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.warnings, vec!["sheet is empty"]);

        let header_only = SheetBuilder::new(100)
            .build(grid(&[&["Phone"], &[""]]), Vec::new())
            .unwrap();
        assert!(header_only.rows.is_empty());
        assert_eq!(header_only.warnings, vec!["no data rows found"]);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let result = SheetBuilder::new(100)
            .build(grid(&[&["Phone"], &["050"], &["  "], &["051"]]), Vec::new())
            .unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].index, 1);
        assert_eq!(result.rows[1].line, 4);
    }
}
