use crate::domain::import::{MergeCandidate, SimulationResult, ValidRecord};

/// Dry run: what a commit of these buckets would produce. Touches nothing.
pub fn simulate<I>(valid: &[ValidRecord<I>], to_merge: &[MergeCandidate<I>]) -> SimulationResult {
    SimulationResult {
        to_add: valid.len() + to_merge.len(),
        to_create: valid.len(),
        to_merge: to_merge.len(),
    }
}
