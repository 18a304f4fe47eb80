// ============================================================
// CSV PARSER
// ============================================================
// Decode CSV bytes with encoding and delimiter detection

use csv::{ReaderBuilder, Trim};
use encoding_rs::Encoding;

use super::RawGrid;
use crate::domain::error::{AppError, Result};

/// CSV parser with encoding detection
pub struct CsvParser {
    /// Delimiter character; detected from content when `None`
    delimiter: Option<u8>,

    /// Encoding used when the bytes carry no BOM and are not UTF-8
    fallback_encoding: &'static Encoding,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: None,
            fallback_encoding: encoding_rs::WINDOWS_1255,
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed delimiter instead of detecting one
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_fallback_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.fallback_encoding = encoding;
        self
    }

    /// Decode and split the file into trimmed cells, header row included
    pub fn read_grid(&self, bytes: &[u8]) -> Result<RawGrid> {
        let content = self.decode(bytes)?;
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(&content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .trim(Trim::All)
            .flexible(true) // Allow rows with different lengths
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(RawGrid {
            rows,
            warnings: Vec::new(),
        })
    }

    /// BOM first, then strict UTF-8, then the fallback legacy encoding
    fn decode(&self, bytes: &[u8]) -> Result<String> {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            if had_errors {
                return Err(AppError::ParseError(format!(
                    "File is marked as {} but contains invalid bytes",
                    encoding.name()
                )));
            }
            return Ok(text.into_owned());
        }

        if let Ok(text) = std::str::from_utf8(bytes) {
            return Ok(text.to_string());
        }

        self.fallback_encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| AppError::ParseError("unknown encoding".to_string()))
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(10)
            .collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let grid = CsvParser::new()
            .read_grid(b"name, age ,city\nAlice,30,NYC\nBob,25,LA")
            .unwrap();

        assert_eq!(grid.rows.len(), 3);
        assert_eq!(grid.rows[0], vec!["name", "age", "city"]);
        assert_eq!(grid.rows[2][0], "Bob");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(CsvParser::detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(CsvParser::detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(CsvParser::detect_delimiter("a\tb\nc\td"), b'\t');
        assert_eq!(CsvParser::detect_delimiter(""), b',');
    }

    #[test]
    fn test_quoted_fields_keep_delimiters() {
        let grid = CsvParser::new()
            .read_grid(b"phone,notes\n0501234567,\"late, but paid\"\n")
            .unwrap();
        assert_eq!(grid.rows[1][1], "late, but paid");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("טלפון,שם\n0501234567,משה\n".as_bytes());
        let grid = CsvParser::new().read_grid(&bytes).unwrap();
        assert_eq!(grid.rows[0][0], "טלפון");
    }

    #[test]
    fn test_utf16_bom_is_decoded() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "phone\n050\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let grid = CsvParser::new().read_grid(&bytes).unwrap();
        assert_eq!(grid.rows[1][0], "050");
    }

    #[test]
    fn test_legacy_hebrew_fallback() {
        // "שלום" in windows-1255
        let bytes = [b'n', b'a', b'm', b'e', b'\n', 0xF9, 0xEC, 0xE5, 0xED, b'\n'];
        let grid = CsvParser::new().read_grid(&bytes).unwrap();
        assert_eq!(grid.rows[1][0], "שלום");
    }

    #[test]
    fn test_undecodable_bytes_are_unknown_encoding() {
        // 0xFF is unassigned in windows-1255 and invalid UTF-8
        let bytes = [b'a', b'\n', 0xFF, 0xFF];
        let err = CsvParser::new().read_grid(&bytes).unwrap_err();
        assert!(matches!(err, AppError::ParseError(msg) if msg == "unknown encoding"));
    }
}
