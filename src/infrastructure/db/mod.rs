pub mod connection;
pub mod sqlite;

use crate::domain::error::Result;
use crate::domain::import::{
    DonorFields, DonorRef, OrgScope, PledgeFields, PledgeRef, YahrzeitFields, YahrzeitRef,
};
use async_trait::async_trait;

pub use sqlite::SqliteImportStore;

/// Storage the import engine reads from and writes to. Every call is tenant-scoped.
#[async_trait]
pub trait ImportStore: Send + Sync {
    async fn find_donor_by_normalized_phone(
        &self,
        scope: &OrgScope,
        phone: &str,
    ) -> Result<Option<DonorRef>>;

    /// Current state of a donor already linked by id
    async fn find_donor_by_id(&self, scope: &OrgScope, id: i64) -> Result<Option<DonorRef>>;

    async fn insert_donor(&self, scope: &OrgScope, fields: &DonorFields) -> Result<DonorRef>;

    /// Overwrite `existing` with an already-merged field set
    async fn merge_donor(
        &self,
        scope: &OrgScope,
        existing: &DonorRef,
        fields: &DonorFields,
    ) -> Result<DonorRef>;

    async fn insert_pledge(&self, scope: &OrgScope, fields: &PledgeFields) -> Result<PledgeRef>;

    async fn insert_yahrzeit(
        &self,
        scope: &OrgScope,
        fields: &YahrzeitFields,
    ) -> Result<YahrzeitRef>;
}
