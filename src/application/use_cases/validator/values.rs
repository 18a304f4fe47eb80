use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;
use validator::ValidateEmail;

const CURRENCY_MARKS: &[&str] = &["₪", "$", "€", "£", "ILS", "NIS", "USD"];

/// Positive decimal amount; tolerates currency marks and thousands separators
pub fn parse_amount(raw: &str) -> Result<BigDecimal, String> {
    let mut cleaned = raw.trim().to_string();
    for mark in CURRENCY_MARKS {
        cleaned = cleaned.replace(mark, "");
    }
    let cleaned: String = cleaned
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    let amount = BigDecimal::from_str(&cleaned)
        .map_err(|_| format!("'{}' is not a number", raw.trim()))?;

    if amount <= BigDecimal::from(0) {
        return Err(format!("amount must be positive, got {}", raw.trim()));
    }
    Ok(amount)
}

/// ISO `YYYY-MM-DD`, optionally followed by a time part
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    let date_part = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date (expected YYYY-MM-DD)", trimmed))
}

pub fn is_valid_email(raw: &str) -> bool {
    raw.trim().validate_email()
}
