use async_trait::async_trait;

use super::rules::DomainRules;
use super::values::{parse_amount, parse_iso_date};
use crate::domain::error::{AppError, Result};
use crate::domain::import::{
    fields, ApprovedRecord, Disposition, DonorRef, FieldError, OrgScope, PledgeFields,
    PledgeFrequency, PledgeInput,
};
use crate::infrastructure::db::ImportStore;

/// Pledges attach to an existing donor; they never create one
#[derive(Debug, Clone, Default)]
pub struct PledgeRules;

impl PledgeRules {
    pub fn new() -> Self {
        Self
    }

    fn build_fields(input: &PledgeInput, donor_id: i64) -> std::result::Result<PledgeFields, Vec<FieldError>> {
        let mut errors = Vec::new();

        let total_amount = match parse_amount(input.total_amount.as_deref().unwrap_or_default()) {
            Ok(amount) => Some(amount),
            Err(msg) => {
                errors.push(FieldError::new(fields::TOTAL_AMOUNT, msg));
                None
            }
        };

        let start_date = match input.start_date.as_deref().map(parse_iso_date) {
            Some(Ok(date)) => Some(date),
            Some(Err(msg)) => {
                errors.push(FieldError::new(fields::START_DATE, msg));
                None
            }
            None => None,
        };

        let frequency = match input.frequency.as_deref() {
            Some(raw) => match PledgeFrequency::parse(raw) {
                Some(freq) => Some(freq),
                None => {
                    errors.push(FieldError::new(
                        fields::FREQUENCY,
                        format!("'{}' is not one of one_time, weekly, monthly, yearly", raw),
                    ));
                    None
                }
            },
            None => None,
        };

        match total_amount {
            Some(total_amount) if errors.is_empty() => Ok(PledgeFields {
                donor_id,
                total_amount,
                start_date,
                frequency,
                notes: input.notes.clone(),
            }),
            _ => Err(errors),
        }
    }
}

#[async_trait]
impl DomainRules for PledgeRules {
    type Input = PledgeInput;

    fn classify(&self, input: &PledgeInput, parent: Option<&DonorRef>) -> Vec<FieldError> {
        let donor_id = parent.map(|p| p.id).unwrap_or_default();
        match Self::build_fields(input, donor_id) {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        }
    }

    async fn persist(
        &self,
        store: &dyn ImportStore,
        scope: &OrgScope,
        record: &ApprovedRecord<PledgeInput>,
    ) -> Result<Disposition> {
        let donor_id = record.context.donor_id.ok_or_else(|| {
            AppError::Internal(format!(
                "pledge on line {} approved without a resolved donor",
                record.candidate.line
            ))
        })?;

        let pledge = Self::build_fields(&record.candidate.input, donor_id).map_err(|errors| {
            AppError::ValidationError(
                errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        store.insert_pledge(scope, &pledge).await?;
        Ok(Disposition::Added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: &str) -> PledgeInput {
        PledgeInput {
            phone: Some("0501234567".to_string()),
            total_amount: Some(amount.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_pledge_has_no_errors() {
        let mut pledge = input("1,800");
        pledge.start_date = Some("2024-09-01".to_string());
        pledge.frequency = Some("Monthly".to_string());
        assert!(PledgeRules::new().classify(&pledge, None).is_empty());
    }

    #[test]
    fn test_every_bad_value_is_reported() {
        let mut pledge = input("lots");
        pledge.start_date = Some("soon".to_string());
        pledge.frequency = Some("sometimes".to_string());

        let errors = PledgeRules::new().classify(&pledge, None);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["totalAmount", "startDate", "frequency"]);
    }
}
