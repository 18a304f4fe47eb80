use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical field names shared by the column mapping, the validator and the exporter.
pub mod fields {
    pub const PHONE: &str = "phone";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const EMAIL: &str = "email";
    pub const ADDRESS_CITY: &str = "addressCity";
    pub const NOTES: &str = "notes";

    pub const TOTAL_AMOUNT: &str = "totalAmount";
    pub const START_DATE: &str = "startDate";
    pub const FREQUENCY: &str = "frequency";

    pub const DECEASED_NAME: &str = "deceasedName";
    pub const HEBREW_DATE: &str = "hebrewDate";
    pub const SECULAR_DATE: &str = "secularDate";
    pub const RELATIONSHIP: &str = "relationship";
    pub const CONTACT_EMAIL: &str = "contactEmail";
    pub const CONTACT_PHONE: &str = "contactPhone";
}

use fields::*;

const DONOR_FIELDS: &[&str] = &[
    PHONE,
    FIRST_NAME,
    LAST_NAME,
    DISPLAY_NAME,
    EMAIL,
    ADDRESS_CITY,
    NOTES,
];
const PLEDGE_FIELDS: &[&str] = &[PHONE, TOTAL_AMOUNT, START_DATE, FREQUENCY, NOTES];
const YAHRZEIT_FIELDS: &[&str] = &[
    PHONE,
    DECEASED_NAME,
    HEBREW_DATE,
    SECULAR_DATE,
    RELATIONSHIP,
    NOTES,
    CONTACT_EMAIL,
    CONTACT_PHONE,
];

/// Kind of record an import session produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportDomain {
    Donor,
    Pledge,
    Yahrzeit,
}

impl ImportDomain {
    /// Canonical fields in template/column order.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            ImportDomain::Donor => DONOR_FIELDS,
            ImportDomain::Pledge => PLEDGE_FIELDS,
            ImportDomain::Yahrzeit => YAHRZEIT_FIELDS,
        }
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ImportDomain::Donor => &[PHONE],
            ImportDomain::Pledge => &[PHONE, TOTAL_AMOUNT],
            ImportDomain::Yahrzeit => &[PHONE, DECEASED_NAME, HEBREW_DATE, SECULAR_DATE],
        }
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required_fields().contains(&field)
    }

    /// Dependent domains need an existing donor; donor imports create or merge one.
    pub fn requires_parent(&self) -> bool {
        !matches!(self, ImportDomain::Donor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportDomain::Donor => "donor",
            ImportDomain::Pledge => "pledge",
            ImportDomain::Yahrzeit => "yahrzeit",
        }
    }
}

impl fmt::Display for ImportDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
