use csv::Writer;

use crate::domain::error::{AppError, Result};
use crate::domain::import::{fields, ImportDomain};

/// Blank import template: canonical headers plus one example row
pub fn template_csv(domain: ImportDomain) -> Result<Vec<u8>> {
    let headers = domain.fields();
    let sample: Vec<&str> = headers.iter().map(|f| sample_value(f)).collect();

    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    writer.write_record(&sample)?;
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush template CSV: {}", e)))
}

fn sample_value(field: &str) -> &'static str {
    match field {
        fields::PHONE => "050-123-4567",
        fields::FIRST_NAME => "Moshe",
        fields::LAST_NAME => "Cohen",
        fields::DISPLAY_NAME => "Moshe Cohen",
        fields::EMAIL => "moshe@example.org",
        fields::ADDRESS_CITY => "Jerusalem",
        fields::TOTAL_AMOUNT => "1800",
        fields::START_DATE => "2024-09-01",
        fields::FREQUENCY => "monthly",
        fields::DECEASED_NAME => "Avraham Cohen",
        fields::HEBREW_DATE => "ט׳ באב",
        fields::SECULAR_DATE => "2020-07-30",
        fields::RELATIONSHIP => "father",
        fields::CONTACT_EMAIL => "family@example.org",
        fields::CONTACT_PHONE => "052-765-4321",
        _ => "",
    }
}
