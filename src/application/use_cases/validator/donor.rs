use async_trait::async_trait;

use super::rules::DomainRules;
use super::values::is_valid_email;
use crate::domain::error::{AppError, Result};
use crate::domain::import::{
    fields, ApprovedRecord, Disposition, DonorFields, DonorInput, DonorRef, FieldConflict,
    FieldError, MergePolicy, OrgScope,
};
use crate::infrastructure::db::ImportStore;

/// New phone creates a donor, a known phone merges into the existing one
#[derive(Debug, Clone, Default)]
pub struct DonorRules {
    merge_policy: MergePolicy,
}

impl DonorRules {
    pub fn new(merge_policy: MergePolicy) -> Self {
        Self { merge_policy }
    }

    fn incoming_fields(input: &DonorInput, normalized_phone: &str) -> DonorFields {
        DonorFields {
            phone: input.phone.clone().unwrap_or_default(),
            normalized_phone: normalized_phone.to_string(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            display_name: input.display_name.clone(),
            email: input.email.as_ref().map(|e| e.trim().to_string()),
            address_city: input.address_city.clone(),
            notes: input.notes.clone(),
        }
    }
}

/// "First Last" for new donors when the file has no display name column
fn display_name_of(input: &DonorInput) -> Option<String> {
    let parts: Vec<&str> = [input.first_name.as_deref(), input.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

#[async_trait]
impl DomainRules for DonorRules {
    type Input = DonorInput;

    fn classify(&self, input: &DonorInput, _parent: Option<&DonorRef>) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(email) = input.email.as_deref() {
            if !is_valid_email(email) {
                errors.push(FieldError::new(fields::EMAIL, format!("'{}' is not a valid email", email)));
            }
        }
        errors
    }

    fn conflicts(&self, input: &DonorInput, existing: &DonorRef) -> Vec<FieldConflict> {
        let incoming = Self::incoming_fields(input, &existing.fields.normalized_phone);
        MergePolicy::conflicts(&existing.fields, &incoming)
    }

    async fn persist(
        &self,
        store: &dyn ImportStore,
        scope: &OrgScope,
        record: &ApprovedRecord<DonorInput>,
    ) -> Result<Disposition> {
        let incoming = Self::incoming_fields(&record.candidate.input, &record.context.normalized_phone);

        match &record.existing {
            Some(linked) => {
                // Earlier rows of the same batch may already have merged into this donor.
                let current = store
                    .find_donor_by_id(scope, linked.id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Donor not found: {}", linked.id)))?;
                let merged = self.merge_policy.apply(&current.fields, &incoming);
                store.merge_donor(scope, &current, &merged).await?;
                Ok(Disposition::Merged)
            }
            None => {
                let incoming = DonorFields {
                    display_name: incoming
                        .display_name
                        .clone()
                        .or_else(|| display_name_of(&record.candidate.input)),
                    ..incoming
                };
                store.insert_donor(scope, &incoming).await?;
                Ok(Disposition::Added)
            }
        }
    }
}
