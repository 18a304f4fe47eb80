use serde::{Deserialize, Serialize};
use std::fmt;

use super::candidate::Candidate;
use super::records::DonorRef;
use super::validation::ResolvedContext;

/// A record the operator approved, with everything needed to write it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedRecord<I> {
    pub candidate: Candidate<I>,
    pub context: ResolvedContext,
    /// Present when the record merges into an existing donor
    pub existing: Option<DonorRef>,
}

/// Dry-run projection of a commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub to_add: usize,
    pub to_create: usize,
    pub to_merge: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitProgress {
    pub processed: usize,
    pub added: usize,
    pub merged: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Added,
    Merged,
    Skipped,
    /// Failed validation; never reached the committer
    Rejected,
    /// No parent donor; never reached the committer
    LinkFailed,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Added => "added",
            Disposition::Merged => "merged",
            Disposition::Skipped => "skipped",
            Disposition::Rejected => "rejected",
            Disposition::LinkFailed => "link_failed",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-row line of the downloadable result log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub index: usize,
    pub line: usize,
    pub phone: String,
    pub disposition: Disposition,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    pub added: usize,
    pub merged: usize,
    pub skipped: usize,
    pub outcomes: Vec<RowOutcome>,
    pub result_csv: Vec<u8>,
}
