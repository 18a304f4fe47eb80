use async_trait::async_trait;

use crate::domain::error::Result;
use crate::domain::import::{
    ApprovedRecord, CandidateInput, Disposition, DonorRef, FieldConflict, FieldError, OrgScope,
};
use crate::infrastructure::db::ImportStore;

/// What differs between donor, pledge and yahrzeit imports.
/// Parsing, mapping, simulation and export never look past this seam.
#[async_trait]
pub trait DomainRules: Send + Sync {
    type Input: CandidateInput;

    fn required_fields(&self) -> &'static [&'static str] {
        <Self::Input as CandidateInput>::DOMAIN.required_fields()
    }

    /// Donor owning (or duplicated by) this record, looked up by normalized phone
    async fn resolve_parent(
        &self,
        store: &dyn ImportStore,
        scope: &OrgScope,
        normalized_phone: &str,
    ) -> Result<Option<DonorRef>> {
        store
            .find_donor_by_normalized_phone(scope, normalized_phone)
            .await
    }

    /// Value-level checks once linking succeeded. Empty means the record is acceptable.
    fn classify(&self, input: &Self::Input, parent: Option<&DonorRef>) -> Vec<FieldError>;

    /// Field-level differences against a matched donor, for operator review
    fn conflicts(&self, _input: &Self::Input, _existing: &DonorRef) -> Vec<FieldConflict> {
        Vec::new()
    }

    /// Write one approved record using the context captured during validation
    async fn persist(
        &self,
        store: &dyn ImportStore,
        scope: &OrgScope,
        record: &ApprovedRecord<Self::Input>,
    ) -> Result<Disposition>;
}
