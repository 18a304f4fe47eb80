use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::import_domain::{fields, ImportDomain};
use crate::domain::error::{AppError, Result};

/// Sentinel the mapping form uses for "no column selected"
pub const UNMAPPED: &str = "unmapped";

/// Operator-supplied mapping from canonical field name to source header name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    entries: BTreeMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(mut self, field: &str, header: &str) -> Self {
        self.entries.insert(field.to_string(), header.to_string());
        self
    }

    pub fn unmap(mut self, field: &str) -> Self {
        self.entries.insert(field.to_string(), UNMAPPED.to_string());
        self
    }

    /// Source header for `field`, or `None` when missing or explicitly unmapped
    pub fn source_for(&self, field: &str) -> Option<&str> {
        self.entries
            .get(field)
            .map(String::as_str)
            .filter(|header| *header != UNMAPPED && !header.is_empty())
    }

    /// Parse the mapping as posted by the mapping form
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AppError::ValidationError(format!("Invalid column mapping: {}", e)))
    }

    /// Required fields of `domain` that have no source column
    pub fn unmapped_required(&self, domain: ImportDomain) -> Vec<&'static str> {
        domain
            .required_fields()
            .iter()
            .copied()
            .filter(|field| self.source_for(field).is_none())
            .collect()
    }

    /// Headers the mapping points at that the parsed file does not have
    pub fn unknown_headers<'a>(&'a self, headers: &[String]) -> Vec<&'a str> {
        self.entries
            .values()
            .map(String::as_str)
            .filter(|h| *h != UNMAPPED && !h.is_empty())
            .filter(|h| !headers.iter().any(|known| known == h))
            .collect()
    }

    /// Propose a mapping by matching header names and common aliases.
    /// Exact canonical names win over aliases; each header is used at most once.
    pub fn auto_detect(headers: &[String], domain: ImportDomain) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut used: HashSet<usize> = HashSet::new();
        let mut mapping = ColumnMapping::new();

        for field in domain.fields() {
            let canonical = normalize_header(field);
            let exact = normalized
                .iter()
                .enumerate()
                .find(|(idx, h)| !used.contains(idx) && **h == canonical)
                .map(|(idx, _)| idx);

            let found = exact.or_else(|| {
                aliases(field).iter().find_map(|alias| {
                    normalized
                        .iter()
                        .enumerate()
                        .find(|(idx, h)| !used.contains(idx) && h.as_str() == *alias)
                        .map(|(idx, _)| idx)
                })
            });

            mapping = match found {
                Some(idx) => {
                    used.insert(idx);
                    mapping.map(field, &headers[idx])
                }
                None => mapping.unmap(field),
            };
        }

        mapping
    }
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-' && *c != '"' && *c != '\'')
        .flat_map(char::to_lowercase)
        .collect()
}

// Already in normalized form.
fn aliases(field: &str) -> &'static [&'static str] {
    match field {
        fields::PHONE => &["phonenumber", "mobile", "cell", "cellphone", "tel", "telephone", "טלפון", "נייד"],
        fields::FIRST_NAME => &["first", "givenname", "שםפרטי"],
        fields::LAST_NAME => &["last", "surname", "familyname", "שםמשפחה"],
        fields::DISPLAY_NAME => &["name", "fullname", "שם", "שםמלא"],
        fields::EMAIL => &["emailaddress", "mail", "אימייל", "דואל"],
        fields::ADDRESS_CITY => &["city", "town", "עיר"],
        fields::NOTES => &["note", "comments", "remarks", "הערות"],
        fields::TOTAL_AMOUNT => &["amount", "total", "sum", "סכום"],
        fields::START_DATE => &["start", "date", "תאריךהתחלה"],
        fields::FREQUENCY => &["recurrence", "interval", "תדירות"],
        fields::DECEASED_NAME => &["deceased", "niftar", "שםהנפטר"],
        fields::HEBREW_DATE => &["hebrew", "תאריךעברי"],
        fields::SECULAR_DATE => &["gregoriandate", "dateofdeath", "date", "תאריךלועזי"],
        fields::RELATIONSHIP => &["relation", "קרבה"],
        fields::CONTACT_EMAIL => &["email", "emailaddress"],
        fields::CONTACT_PHONE => &["contact", "contactnumber"],
        _ => &[],
    }
}
