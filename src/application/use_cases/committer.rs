// ============================================================
// COMMITTER
// ============================================================
// Sequential write of the approved set, with progress reporting

use tracing::{debug, info, warn};

use super::result_exporter;
use super::validator::DomainRules;
use crate::domain::error::{AppError, Result};
use crate::domain::import::{
    ApprovedRecord, CandidateInput, CommitProgress, CommitResult, Disposition, OrgScope,
    RowOutcome,
};
use crate::infrastructure::db::ImportStore;

pub struct Committer<'a> {
    store: &'a dyn ImportStore,
    scope: OrgScope,
}

impl<'a> Committer<'a> {
    pub fn new(store: &'a dyn ImportStore, scope: OrgScope) -> Self {
        Self { store, scope }
    }

    /// Write `records` in order, one at a time.
    ///
    /// A failed write is recorded as `skipped` and the run continues. Storage
    /// outages and errors returned by `on_progress` abort the remaining batch;
    /// rows already written stay written.
    pub async fn commit<R, F>(
        &self,
        rules: &R,
        records: Vec<ApprovedRecord<R::Input>>,
        mut on_progress: F,
    ) -> Result<CommitResult>
    where
        R: DomainRules,
        F: FnMut(CommitProgress) -> Result<()>,
    {
        let domain = <R::Input as CandidateInput>::DOMAIN;
        let total = records.len();
        let mut progress = CommitProgress::default();
        let mut outcomes = Vec::with_capacity(total);

        info!(
            domain = %domain,
            organization_id = self.scope.organization_id,
            total,
            "Starting import commit"
        );

        for record in &records {
            let candidate = &record.candidate;
            let written = rules
                .persist(self.store, &self.scope, record)
                .await
                .and_then(|disposition| match disposition {
                    Disposition::Added | Disposition::Merged | Disposition::Skipped => {
                        Ok(disposition)
                    }
                    other => Err(AppError::Internal(format!(
                        "persist returned '{}' for line {}",
                        other, candidate.line
                    ))),
                });

            let (disposition, message) = match written {
                Ok(disposition) => (disposition, None),
                Err(e) if e.is_fatal() => {
                    warn!(
                        domain = %domain,
                        line = candidate.line,
                        processed = progress.processed,
                        "Commit aborted: {}",
                        e
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(domain = %domain, line = candidate.line, "Skipping row: {}", e);
                    (Disposition::Skipped, Some(e.to_string()))
                }
            };

            match disposition {
                Disposition::Added => progress.added += 1,
                Disposition::Merged => progress.merged += 1,
                _ => progress.skipped += 1,
            }
            progress.processed += 1;
            debug!(line = candidate.line, disposition = %disposition, "Row committed");

            outcomes.push(RowOutcome {
                index: candidate.index,
                line: candidate.line,
                phone: candidate.input.phone().unwrap_or_default().to_string(),
                disposition,
                message,
            });

            on_progress(progress)?;
        }

        info!(
            domain = %domain,
            organization_id = self.scope.organization_id,
            added = progress.added,
            merged = progress.merged,
            skipped = progress.skipped,
            "Import commit finished"
        );

        let result_csv = result_exporter::to_csv(&outcomes)?;
        Ok(CommitResult {
            added: progress.added,
            merged: progress.merged,
            skipped: progress.skipped,
            outcomes,
            result_csv,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::application::use_cases::validator::{
        DonorRules, PhoneNormalizer, PledgeRules, Validator,
    };
    use crate::domain::import::{
        Candidate, DonorFields, DonorInput, DonorRef, FieldError, PledgeFields, PledgeInput,
        PledgeRef, YahrzeitFields, YahrzeitRef,
    };
    use crate::infrastructure::db::SqliteImportStore;

    const ORG: OrgScope = OrgScope { organization_id: 3 };

    /// Delegates to SQLite but fails donor inserts for chosen phones
    struct FlakyStore {
        inner: SqliteImportStore,
        failing_phones: HashSet<String>,
        outage: AtomicBool,
    }

    impl FlakyStore {
        async fn new(failing: &[&str]) -> Self {
            Self {
                inner: SqliteImportStore::in_memory().await.unwrap(),
                failing_phones: failing.iter().map(|p| p.to_string()).collect(),
                outage: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ImportStore for FlakyStore {
        async fn find_donor_by_normalized_phone(
            &self,
            scope: &OrgScope,
            phone: &str,
        ) -> Result<Option<DonorRef>> {
            self.inner.find_donor_by_normalized_phone(scope, phone).await
        }

        async fn find_donor_by_id(&self, scope: &OrgScope, id: i64) -> Result<Option<DonorRef>> {
            self.inner.find_donor_by_id(scope, id).await
        }

        async fn insert_donor(&self, scope: &OrgScope, fields: &DonorFields) -> Result<DonorRef> {
            if self.outage.load(Ordering::SeqCst) {
                return Err(AppError::StorageUnavailable("connection reset".to_string()));
            }
            if self.failing_phones.contains(&fields.normalized_phone) {
                return Err(AppError::DatabaseError("simulated write failure".to_string()));
            }
            self.inner.insert_donor(scope, fields).await
        }

        async fn merge_donor(
            &self,
            scope: &OrgScope,
            existing: &DonorRef,
            fields: &DonorFields,
        ) -> Result<DonorRef> {
            self.inner.merge_donor(scope, existing, fields).await
        }

        async fn insert_pledge(&self, scope: &OrgScope, fields: &PledgeFields) -> Result<PledgeRef> {
            self.inner.insert_pledge(scope, fields).await
        }

        async fn insert_yahrzeit(
            &self,
            scope: &OrgScope,
            fields: &YahrzeitFields,
        ) -> Result<YahrzeitRef> {
            self.inner.insert_yahrzeit(scope, fields).await
        }
    }

    fn donor_candidates(phones: &[&str]) -> Vec<Candidate<DonorInput>> {
        phones
            .iter()
            .enumerate()
            .map(|(index, phone)| Candidate {
                index,
                line: index + 2,
                input: DonorInput {
                    phone: Some(phone.to_string()),
                    first_name: Some(format!("Donor {}", index)),
                    ..Default::default()
                },
            })
            .collect()
    }

    async fn approved_donors(
        store: &dyn ImportStore,
        phones: &[&str],
    ) -> Vec<ApprovedRecord<DonorInput>> {
        let normalizer = PhoneNormalizer::default();
        Validator::new(store, ORG, &normalizer)
            .validate(&DonorRules::default(), donor_candidates(phones))
            .await
            .unwrap()
            .approved(true)
    }

    #[tokio::test]
    async fn test_commit_three_new_donors() {
        let store = SqliteImportStore::in_memory().await.unwrap();
        let records =
            approved_donors(&store, &["0501111111", "0502222222", "0503333333"]).await;

        let result = Committer::new(&store, ORG)
            .commit(&DonorRules::default(), records, |_| Ok(()))
            .await
            .unwrap();

        assert_eq!(result.added, 3);
        assert_eq!(result.merged, 0);
        assert_eq!(result.skipped, 0);
        assert_eq!(store.count_donors(&ORG).await.unwrap(), 3);

        let csv = String::from_utf8(result.result_csv).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.lines().skip(1).all(|line| line.contains(",added,")));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_balanced() {
        let store = FlakyStore::new(&["0502222222"]).await;
        let records =
            approved_donors(&store, &["0501111111", "0502222222", "0503333333", "0504444444"])
                .await;

        let mut seen: Vec<CommitProgress> = Vec::new();
        Committer::new(&store, ORG)
            .commit(&DonorRules::default(), records, |p| {
                seen.push(p);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(seen.len(), 4);
        for (i, p) in seen.iter().enumerate() {
            assert_eq!(p.processed, i + 1);
            assert_eq!(p.processed, p.added + p.merged + p.skipped);
        }
        for pair in seen.windows(2) {
            assert!(pair[1].processed > pair[0].processed);
            assert!(pair[1].added >= pair[0].added);
            assert!(pair[1].skipped >= pair[0].skipped);
        }
    }

    #[tokio::test]
    async fn test_failed_row_does_not_abort_run() {
        let store = FlakyStore::new(&["0502222222"]).await;
        let records =
            approved_donors(&store, &["0501111111", "0502222222", "0503333333"]).await;

        let result = Committer::new(&store, ORG)
            .commit(&DonorRules::default(), records, |_| Ok(()))
            .await
            .unwrap();

        assert_eq!(result.added, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.outcomes[1].disposition, Disposition::Skipped);
        assert!(result.outcomes[1]
            .message
            .as_deref()
            .unwrap()
            .contains("simulated write failure"));
        assert_eq!(result.outcomes[2].disposition, Disposition::Added);
        assert_eq!(store.inner.count_donors(&ORG).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_storage_outage_aborts() {
        let store = FlakyStore::new(&[]).await;
        let records = approved_donors(&store, &["0501111111", "0502222222"]).await;
        store.outage.store(true, Ordering::SeqCst);

        let err = Committer::new(&store, ORG)
            .commit(&DonorRules::default(), records, |_| Ok(()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn test_callback_error_aborts_remaining_batch() {
        let store = SqliteImportStore::in_memory().await.unwrap();
        let records =
            approved_donors(&store, &["0501111111", "0502222222", "0503333333"]).await;

        let err = Committer::new(&store, ORG)
            .commit(&DonorRules::default(), records, |p| {
                if p.processed == 2 {
                    Err(AppError::CallbackError("progress bar went away".to_string()))
                } else {
                    Ok(())
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::CallbackError(_)));
        // Rows written before the failing callback are kept.
        assert_eq!(store.count_donors(&ORG).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_donor_merges() {
        let store = SqliteImportStore::in_memory().await.unwrap();
        store
            .insert_donor(
                &ORG,
                &DonorFields {
                    phone: "050-111-1111".to_string(),
                    normalized_phone: "0501111111".to_string(),
                    first_name: Some("Existing".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let records = approved_donors(&store, &["050 111 1111", "0502222222"]).await;
        let result = Committer::new(&store, ORG)
            .commit(&DonorRules::default(), records, |_| Ok(()))
            .await
            .unwrap();

        assert_eq!(result.added, 1);
        assert_eq!(result.merged, 1);
        assert_eq!(store.count_donors(&ORG).await.unwrap(), 2);
        let existing = store
            .find_donor_by_normalized_phone(&ORG, "0501111111")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(existing.fields.first_name.as_deref(), Some("Existing"));
    }

    #[tokio::test]
    async fn test_pledges_use_donor_resolved_at_validation() {
        let store = SqliteImportStore::in_memory().await.unwrap();
        store
            .insert_donor(
                &ORG,
                &DonorFields {
                    phone: "0501111111".to_string(),
                    normalized_phone: "0501111111".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let normalizer = PhoneNormalizer::default();
        let candidates = vec![Candidate {
            index: 0,
            line: 2,
            input: PledgeInput {
                phone: Some("+972-50-111-1111".to_string()),
                total_amount: Some("₪1,800".to_string()),
                ..Default::default()
            },
        }];
        let validation = Validator::new(&store, ORG, &normalizer)
            .validate(&PledgeRules::new(), candidates)
            .await
            .unwrap();
        assert_eq!(validation.valid.len(), 1);

        let result = Committer::new(&store, ORG)
            .commit(&PledgeRules::new(), validation.approved(true), |_| Ok(()))
            .await
            .unwrap();
        assert_eq!(result.added, 1);
        assert_eq!(store.count_pledges(&ORG).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repeated_merges_into_one_donor_accumulate() {
        let store = SqliteImportStore::in_memory().await.unwrap();
        store
            .insert_donor(
                &ORG,
                &DonorFields {
                    phone: "0501111111".to_string(),
                    normalized_phone: "0501111111".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let candidates = vec![
            Candidate {
                index: 0,
                line: 2,
                input: DonorInput {
                    phone: Some("0501111111".to_string()),
                    first_name: Some("Moshe".to_string()),
                    ..Default::default()
                },
            },
            Candidate {
                index: 1,
                line: 3,
                input: DonorInput {
                    phone: Some("050-111-1111".to_string()),
                    address_city: Some("Haifa".to_string()),
                    ..Default::default()
                },
            },
        ];
        let normalizer = PhoneNormalizer::default();
        let records = Validator::new(&store, ORG, &normalizer)
            .validate(&DonorRules::default(), candidates)
            .await
            .unwrap()
            .approved(true);

        let result = Committer::new(&store, ORG)
            .commit(&DonorRules::default(), records, |_| Ok(()))
            .await
            .unwrap();
        assert_eq!(result.merged, 2);

        let donor = store
            .find_donor_by_normalized_phone(&ORG, "0501111111")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(donor.fields.first_name.as_deref(), Some("Moshe"));
        assert_eq!(donor.fields.address_city.as_deref(), Some("Haifa"));
    }

    /// Rules that hand back a disposition only the validator may assign
    struct MisbehavingRules;

    #[async_trait]
    impl DomainRules for MisbehavingRules {
        type Input = DonorInput;

        fn classify(&self, _input: &DonorInput, _parent: Option<&DonorRef>) -> Vec<FieldError> {
            Vec::new()
        }

        async fn persist(
            &self,
            _store: &dyn ImportStore,
            _scope: &OrgScope,
            _record: &ApprovedRecord<DonorInput>,
        ) -> Result<Disposition> {
            Ok(Disposition::Rejected)
        }
    }

    #[tokio::test]
    async fn test_unexpected_disposition_is_not_counted_as_added() {
        let store = SqliteImportStore::in_memory().await.unwrap();
        let records = approved_donors(&store, &["0501111111"]).await;

        let mut calls = 0;
        let err = Committer::new(&store, ORG)
            .commit(&MisbehavingRules, records, |_| {
                calls += 1;
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(calls, 0);
    }
}
