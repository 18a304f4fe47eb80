// ============================================================
// IMPORT DOMAIN LAYER
// ============================================================
// Core types for bulk donor/pledge/yahrzeit imports
// No I/O, no async

mod candidate;
mod commit;
mod import_domain;
mod mapping;
mod merge_policy;
mod records;
mod row;
mod validation;

pub use candidate::{Candidate, CandidateInput, DonorInput, FieldValues, PledgeInput, YahrzeitInput};
pub use commit::{
    ApprovedRecord, CommitProgress, CommitResult, Disposition, RowOutcome, SimulationResult,
};
pub use import_domain::{fields, ImportDomain};
pub use mapping::{ColumnMapping, UNMAPPED};
pub use merge_policy::{FieldConflict, MergePolicy};
pub use records::{
    DonorFields, DonorRef, OrgScope, PledgeFields, PledgeFrequency, PledgeRef, YahrzeitFields,
    YahrzeitRef,
};
pub use row::{ParseResult, Row, SourceFormat};
pub use validation::{
    FieldError, LinkFailedRecord, LinkFailure, MergeCandidate, RejectedRecord, ResolvedContext,
    ValidRecord, ValidationResult,
};
