// ============================================================
// CANDIDATE RECORDS
// ============================================================
// Rows after column mapping, before validation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

use super::import_domain::{fields, ImportDomain};

/// Canonical field name -> trimmed, non-empty cell value
pub type FieldValues = HashMap<&'static str, String>;

/// Typed input for one import domain
pub trait CandidateInput: Clone + Debug + Serialize + Send + Sync + 'static {
    const DOMAIN: ImportDomain;

    fn from_values(values: &FieldValues) -> Self;

    /// Value of a canonical field, if present
    fn field(&self, name: &str) -> Option<&str>;

    fn phone(&self) -> Option<&str> {
        self.field(fields::PHONE)
    }
}

/// A mapped row with its position in the source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<I> {
    pub index: usize,
    pub line: usize,
    pub input: I,
}

fn take(values: &FieldValues, name: &str) -> Option<String> {
    values.get(name).cloned()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorInput {
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub address_city: Option<String>,
    pub notes: Option<String>,
}

impl CandidateInput for DonorInput {
    const DOMAIN: ImportDomain = ImportDomain::Donor;

    fn from_values(values: &FieldValues) -> Self {
        Self {
            phone: take(values, fields::PHONE),
            first_name: take(values, fields::FIRST_NAME),
            last_name: take(values, fields::LAST_NAME),
            display_name: take(values, fields::DISPLAY_NAME),
            email: take(values, fields::EMAIL),
            address_city: take(values, fields::ADDRESS_CITY),
            notes: take(values, fields::NOTES),
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            fields::PHONE => &self.phone,
            fields::FIRST_NAME => &self.first_name,
            fields::LAST_NAME => &self.last_name,
            fields::DISPLAY_NAME => &self.display_name,
            fields::EMAIL => &self.email,
            fields::ADDRESS_CITY => &self.address_city,
            fields::NOTES => &self.notes,
            _ => return None,
        };
        value.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeInput {
    pub phone: Option<String>,
    /// Raw cell text; parsed during validation
    pub total_amount: Option<String>,
    pub start_date: Option<String>,
    pub frequency: Option<String>,
    pub notes: Option<String>,
}

impl CandidateInput for PledgeInput {
    const DOMAIN: ImportDomain = ImportDomain::Pledge;

    fn from_values(values: &FieldValues) -> Self {
        Self {
            phone: take(values, fields::PHONE),
            total_amount: take(values, fields::TOTAL_AMOUNT),
            start_date: take(values, fields::START_DATE),
            frequency: take(values, fields::FREQUENCY),
            notes: take(values, fields::NOTES),
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            fields::PHONE => &self.phone,
            fields::TOTAL_AMOUNT => &self.total_amount,
            fields::START_DATE => &self.start_date,
            fields::FREQUENCY => &self.frequency,
            fields::NOTES => &self.notes,
            _ => return None,
        };
        value.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahrzeitInput {
    pub phone: Option<String>,
    pub deceased_name: Option<String>,
    pub hebrew_date: Option<String>,
    pub secular_date: Option<String>,
    pub relationship: Option<String>,
    pub notes: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl CandidateInput for YahrzeitInput {
    const DOMAIN: ImportDomain = ImportDomain::Yahrzeit;

    fn from_values(values: &FieldValues) -> Self {
        Self {
            phone: take(values, fields::PHONE),
            deceased_name: take(values, fields::DECEASED_NAME),
            hebrew_date: take(values, fields::HEBREW_DATE),
            secular_date: take(values, fields::SECULAR_DATE),
            relationship: take(values, fields::RELATIONSHIP),
            notes: take(values, fields::NOTES),
            contact_email: take(values, fields::CONTACT_EMAIL),
            contact_phone: take(values, fields::CONTACT_PHONE),
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            fields::PHONE => &self.phone,
            fields::DECEASED_NAME => &self.deceased_name,
            fields::HEBREW_DATE => &self.hebrew_date,
            fields::SECULAR_DATE => &self.secular_date,
            fields::RELATIONSHIP => &self.relationship,
            fields::NOTES => &self.notes,
            fields::CONTACT_EMAIL => &self.contact_email,
            fields::CONTACT_PHONE => &self.contact_phone,
            _ => return None,
        };
        value.as_deref()
    }
}
