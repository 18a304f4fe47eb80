use async_trait::async_trait;

use super::phone::PhoneNormalizer;
use super::rules::DomainRules;
use super::values::{is_valid_email, parse_iso_date};
use crate::domain::error::{AppError, Result};
use crate::domain::import::{
    fields, ApprovedRecord, Disposition, DonorRef, FieldError, OrgScope, YahrzeitFields,
    YahrzeitInput,
};
use crate::infrastructure::db::ImportStore;

/// Memorial dates attach to an existing donor
#[derive(Debug, Clone, Default)]
pub struct YahrzeitRules {
    phones: PhoneNormalizer,
}

impl YahrzeitRules {
    pub fn new(phones: PhoneNormalizer) -> Self {
        Self { phones }
    }

    fn build_fields(
        &self,
        input: &YahrzeitInput,
        donor_id: i64,
    ) -> std::result::Result<YahrzeitFields, Vec<FieldError>> {
        let mut errors = Vec::new();

        let secular_date = match parse_iso_date(input.secular_date.as_deref().unwrap_or_default()) {
            Ok(date) => Some(date),
            Err(msg) => {
                errors.push(FieldError::new(fields::SECULAR_DATE, msg));
                None
            }
        };

        if let Some(email) = input.contact_email.as_deref() {
            if !is_valid_email(email) {
                errors.push(FieldError::new(
                    fields::CONTACT_EMAIL,
                    format!("'{}' is not a valid email", email),
                ));
            }
        }

        let contact_phone = match input.contact_phone.as_deref() {
            Some(raw) => match self.phones.normalize(raw) {
                Some(normalized) => Some(normalized),
                None => {
                    errors.push(FieldError::new(
                        fields::CONTACT_PHONE,
                        format!("'{}' is not a valid phone number", raw),
                    ));
                    None
                }
            },
            None => None,
        };

        match secular_date {
            Some(secular_date) if errors.is_empty() => Ok(YahrzeitFields {
                donor_id,
                deceased_name: input.deceased_name.clone().unwrap_or_default(),
                hebrew_date: input.hebrew_date.clone().unwrap_or_default(),
                secular_date,
                relationship: input.relationship.clone(),
                notes: input.notes.clone(),
                contact_email: input.contact_email.as_ref().map(|e| e.trim().to_string()),
                contact_phone,
            }),
            _ => Err(errors),
        }
    }
}

#[async_trait]
impl DomainRules for YahrzeitRules {
    type Input = YahrzeitInput;

    fn classify(&self, input: &YahrzeitInput, parent: Option<&DonorRef>) -> Vec<FieldError> {
        let donor_id = parent.map(|p| p.id).unwrap_or_default();
        match self.build_fields(input, donor_id) {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        }
    }

    async fn persist(
        &self,
        store: &dyn ImportStore,
        scope: &OrgScope,
        record: &ApprovedRecord<YahrzeitInput>,
    ) -> Result<Disposition> {
        let donor_id = record.context.donor_id.ok_or_else(|| {
            AppError::Internal(format!(
                "yahrzeit on line {} approved without a resolved donor",
                record.candidate.line
            ))
        })?;

        let yahrzeit = self
            .build_fields(&record.candidate.input, donor_id)
            .map_err(|errors| {
                AppError::ValidationError(
                    errors
                        .iter()
                        .map(|e| format!("{}: {}", e.field, e.message))
                        .collect::<Vec<_>>()
                        .join("; "),
                )
            })?;

        store.insert_yahrzeit(scope, &yahrzeit).await?;
        Ok(Disposition::Added)
    }
}
