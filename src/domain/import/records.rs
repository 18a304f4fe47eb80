use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::import_domain::fields;

/// Tenant every storage call is scoped to; always supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgScope {
    pub organization_id: i64,
}

impl OrgScope {
    pub fn new(organization_id: i64) -> Self {
        Self { organization_id }
    }
}

/// Donor column values as written to the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorFields {
    pub phone: String,
    pub normalized_phone: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub address_city: Option<String>,
    pub notes: Option<String>,
}

impl DonorFields {
    /// Fields a merge may change, in column order
    pub const MERGEABLE: &'static [&'static str] = &[
        fields::FIRST_NAME,
        fields::LAST_NAME,
        fields::DISPLAY_NAME,
        fields::EMAIL,
        fields::ADDRESS_CITY,
        fields::NOTES,
    ];

    pub fn get(&self, name: &str) -> Option<&str> {
        self.slot(name).and_then(|v| v.as_deref())
    }

    pub(crate) fn set(&mut self, name: &str, value: Option<String>) {
        if let Some(slot) = self.slot_mut(name) {
            *slot = value;
        }
    }

    fn slot(&self, name: &str) -> Option<&Option<String>> {
        match name {
            fields::FIRST_NAME => Some(&self.first_name),
            fields::LAST_NAME => Some(&self.last_name),
            fields::DISPLAY_NAME => Some(&self.display_name),
            fields::EMAIL => Some(&self.email),
            fields::ADDRESS_CITY => Some(&self.address_city),
            fields::NOTES => Some(&self.notes),
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            fields::FIRST_NAME => Some(&mut self.first_name),
            fields::LAST_NAME => Some(&mut self.last_name),
            fields::DISPLAY_NAME => Some(&mut self.display_name),
            fields::EMAIL => Some(&mut self.email),
            fields::ADDRESS_CITY => Some(&mut self.address_city),
            fields::NOTES => Some(&mut self.notes),
            _ => None,
        }
    }
}

/// Existing donor as returned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRef {
    pub id: i64,
    pub organization_id: i64,
    pub fields: DonorFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PledgeFrequency {
    OneTime,
    Weekly,
    Monthly,
    Yearly,
}

impl PledgeFrequency {
    /// Accepts canonical names and the spellings operators commonly type
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "onetime" | "once" | "single" | "חדפעמי" => Some(PledgeFrequency::OneTime),
            "weekly" | "week" | "שבועי" => Some(PledgeFrequency::Weekly),
            "monthly" | "month" | "חודשי" => Some(PledgeFrequency::Monthly),
            "yearly" | "annual" | "annually" | "year" | "שנתי" => Some(PledgeFrequency::Yearly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PledgeFrequency::OneTime => "one_time",
            PledgeFrequency::Weekly => "weekly",
            PledgeFrequency::Monthly => "monthly",
            PledgeFrequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for PledgeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PledgeFields {
    pub donor_id: i64,
    pub total_amount: BigDecimal,
    pub start_date: Option<NaiveDate>,
    pub frequency: Option<PledgeFrequency>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgeRef {
    pub id: i64,
    pub donor_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YahrzeitFields {
    pub donor_id: i64,
    pub deceased_name: String,
    pub hebrew_date: String,
    pub secular_date: NaiveDate,
    pub relationship: Option<String>,
    pub notes: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YahrzeitRef {
    pub id: i64,
    pub donor_id: i64,
}
