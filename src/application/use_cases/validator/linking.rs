use tracing::{debug, info};

use super::{DomainRules, Validator};
use crate::domain::error::Result;
use crate::domain::import::{
    fields, Candidate, CandidateInput, FieldError, LinkFailedRecord, LinkFailure, MergeCandidate,
    RejectedRecord, ResolvedContext, ValidRecord, ValidationResult,
};

/// Where a single candidate ends up
enum Classification<I> {
    Valid(ValidRecord<I>),
    Merge(MergeCandidate<I>),
    LinkFailed(LinkFailedRecord<I>),
    Rejected(RejectedRecord<I>),
}

impl<'a> Validator<'a> {
    /// Classify every candidate, in input order. Only a store failure aborts the batch.
    pub async fn validate<R: DomainRules>(
        &self,
        rules: &R,
        candidates: Vec<Candidate<R::Input>>,
    ) -> Result<ValidationResult<R::Input>> {
        let domain = <R::Input as CandidateInput>::DOMAIN;
        let total = candidates.len();
        let mut result = ValidationResult::default();

        for candidate in candidates {
            match self.classify_one(rules, candidate).await? {
                Classification::Valid(record) => result.valid.push(record),
                Classification::Merge(record) => result.to_merge.push(record),
                Classification::LinkFailed(record) => result.link_failed.push(record),
                Classification::Rejected(record) => result.errors.push(record),
            }
        }

        info!(
            domain = %domain,
            organization_id = self.scope.organization_id,
            total,
            valid = result.valid.len(),
            to_merge = result.to_merge.len(),
            link_failed = result.link_failed.len(),
            errors = result.errors.len(),
            "Validated import candidates"
        );
        Ok(result)
    }

    async fn classify_one<R: DomainRules>(
        &self,
        rules: &R,
        candidate: Candidate<R::Input>,
    ) -> Result<Classification<R::Input>> {
        let missing: Vec<FieldError> = rules
            .required_fields()
            .iter()
            .filter(|field| {
                candidate
                    .input
                    .field(field)
                    .map_or(true, |value| value.trim().is_empty())
            })
            .map(|field| FieldError::new(field, "required field is missing"))
            .collect();

        if !missing.is_empty() {
            debug!(line = candidate.line, missing = missing.len(), "Missing required fields");
            return Ok(reject(candidate, missing));
        }

        let raw_phone = candidate.input.phone().unwrap_or_default().trim().to_string();
        let Some(normalized_phone) = self.phones.normalize(&raw_phone) else {
            let error = FieldError::new(
                fields::PHONE,
                format!("'{}' is not a valid phone number", raw_phone),
            );
            return Ok(reject(candidate, vec![error]));
        };

        let parent = rules
            .resolve_parent(self.store, &self.scope, &normalized_phone)
            .await?;

        let domain = <R::Input as CandidateInput>::DOMAIN;
        if domain.requires_parent() && parent.is_none() {
            debug!(line = candidate.line, phone = %normalized_phone, "No donor for dependent record");
            return Ok(Classification::LinkFailed(LinkFailedRecord {
                candidate,
                failure: LinkFailure::no_donor(&raw_phone),
            }));
        }

        let errors = rules.classify(&candidate.input, parent.as_ref());
        if !errors.is_empty() {
            return Ok(reject(candidate, errors));
        }

        let context = ResolvedContext {
            organization_id: self.scope.organization_id,
            normalized_phone,
            donor_id: parent.as_ref().map(|p| p.id),
        };

        Ok(match parent {
            // Donor import hit an existing donor: operator decides on the merge
            Some(existing) if !domain.requires_parent() => {
                let conflicts = rules.conflicts(&candidate.input, &existing);
                Classification::Merge(MergeCandidate {
                    candidate,
                    existing,
                    context,
                    conflicts,
                })
            }
            _ => Classification::Valid(ValidRecord { candidate, context }),
        })
    }
}

fn reject<I>(candidate: Candidate<I>, errors: Vec<FieldError>) -> Classification<I> {
    Classification::Rejected(RejectedRecord { candidate, errors })
}
