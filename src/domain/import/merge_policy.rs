use serde::{Deserialize, Serialize};

use super::records::DonorFields;

/// Which side wins when an existing donor and an incoming row both carry a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Existing non-empty values are kept; incoming values only fill blanks
    #[default]
    FillBlanks,
    /// Incoming non-empty values replace existing ones
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConflict {
    pub field: String,
    pub existing: String,
    pub incoming: String,
}

impl MergePolicy {
    /// Field set to persist for the merged donor. Identity (phone) is always the existing one.
    pub fn apply(&self, existing: &DonorFields, incoming: &DonorFields) -> DonorFields {
        let mut merged = existing.clone();
        for field in DonorFields::MERGEABLE {
            let current = existing.get(field).filter(|v| !v.trim().is_empty());
            let Some(new_value) = incoming.get(field).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            let take_incoming = match self {
                MergePolicy::FillBlanks => current.is_none(),
                MergePolicy::Overwrite => true,
            };
            if take_incoming {
                merged.set(field, Some(new_value.to_string()));
            }
        }
        merged
    }

    /// Fields where both sides are non-empty and differ
    pub fn conflicts(existing: &DonorFields, incoming: &DonorFields) -> Vec<FieldConflict> {
        DonorFields::MERGEABLE
            .iter()
            .filter_map(|field| {
                let old = existing.get(field)?.trim();
                let new = incoming.get(field)?.trim();
                if old.is_empty() || new.is_empty() || old == new {
                    return None;
                }
                Some(FieldConflict {
                    field: field.to_string(),
                    existing: old.to_string(),
                    incoming: new.to_string(),
                })
            })
            .collect()
    }
}
