// ============================================================
// VALIDATION RESULT
// ============================================================
// Four disjoint buckets; every candidate lands in exactly one

use serde::{Deserialize, Serialize};

use super::candidate::Candidate;
use super::commit::ApprovedRecord;
use super::merge_policy::FieldConflict;
use super::records::DonorRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFailure {
    pub reason: String,
}

impl LinkFailure {
    pub fn no_donor(phone: &str) -> Self {
        Self {
            reason: format!("no donor found for phone {}", phone),
        }
    }
}

/// Foreign keys captured at validation time and reused unchanged at commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedContext {
    pub organization_id: i64,
    pub normalized_phone: String,
    /// Parent donor for pledges/yahrzeits, matched donor for merges
    pub donor_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidRecord<I> {
    pub candidate: Candidate<I>,
    pub context: ResolvedContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeCandidate<I> {
    pub candidate: Candidate<I>,
    pub existing: DonorRef,
    pub context: ResolvedContext,
    pub conflicts: Vec<FieldConflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkFailedRecord<I> {
    pub candidate: Candidate<I>,
    pub failure: LinkFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord<I> {
    pub candidate: Candidate<I>,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult<I> {
    pub valid: Vec<ValidRecord<I>>,
    pub to_merge: Vec<MergeCandidate<I>>,
    pub link_failed: Vec<LinkFailedRecord<I>>,
    pub errors: Vec<RejectedRecord<I>>,
}

impl<I> Default for ValidationResult<I> {
    fn default() -> Self {
        Self {
            valid: Vec::new(),
            to_merge: Vec::new(),
            link_failed: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<I: Clone> ValidationResult<I> {
    pub fn total(&self) -> usize {
        self.valid.len() + self.to_merge.len() + self.link_failed.len() + self.errors.len()
    }

    /// Input indices per bucket, in bucket order
    pub fn indices(&self) -> [Vec<usize>; 4] {
        [
            self.valid.iter().map(|r| r.candidate.index).collect(),
            self.to_merge.iter().map(|r| r.candidate.index).collect(),
            self.link_failed.iter().map(|r| r.candidate.index).collect(),
            self.errors.iter().map(|r| r.candidate.index).collect(),
        ]
    }

    /// Records the operator approved for commit, in input order
    pub fn approved(&self, include_merges: bool) -> Vec<ApprovedRecord<I>> {
        let mut approved: Vec<ApprovedRecord<I>> = self
            .valid
            .iter()
            .map(|r| ApprovedRecord {
                candidate: r.candidate.clone(),
                context: r.context.clone(),
                existing: None,
            })
            .collect();

        if include_merges {
            approved.extend(self.to_merge.iter().map(|r| ApprovedRecord {
                candidate: r.candidate.clone(),
                context: r.context.clone(),
                existing: Some(r.existing.clone()),
            }));
        }

        approved.sort_by_key(|r| r.candidate.index);
        approved
    }
}
