use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use super::committer::Committer;
use super::field_mapper;
use super::result_exporter;
use super::simulator;
use super::templates;
use super::validator::{
    DomainRules, DonorRules, PhoneNormalizer, PledgeRules, Validator, YahrzeitRules,
};
use crate::domain::error::{AppError, Result};
use crate::domain::import::{
    ApprovedRecord, Candidate, CandidateInput, ColumnMapping, CommitProgress, CommitResult,
    ImportDomain, OrgScope, ParseResult, Row, SimulationResult, SourceFormat, ValidationResult,
};
use crate::infrastructure::config::ImportConfig;
use crate::infrastructure::db::{ImportStore, SqliteImportStore};
use crate::infrastructure::tabular::TabularParser;

/// One import session for one organization.
///
/// Stages are independent calls; the caller sequences them
/// (parse, map, validate, simulate, commit) and keeps the intermediate results.
pub struct ImportUseCase {
    store: Arc<dyn ImportStore>,
    scope: OrgScope,
    config: ImportConfig,
    parser: TabularParser,
    phones: PhoneNormalizer,
    session_id: Uuid,
}

impl ImportUseCase {
    pub fn new(store: Arc<dyn ImportStore>, scope: OrgScope, config: ImportConfig) -> Result<Self> {
        config.validate()?;
        let parser = TabularParser::new()
            .with_fallback_encoding(&config.fallback_encoding)?
            .with_max_rows(config.max_rows);
        let phones = PhoneNormalizer::new(config.country_code.clone());

        Ok(Self {
            store,
            scope,
            config,
            parser,
            phones,
            session_id: Uuid::new_v4(),
        })
    }

    /// Everything from `config`: installs logging with `log_filter` and opens the
    /// SQLite store at `database_url`
    pub async fn connect(scope: OrgScope, config: ImportConfig) -> Result<Self> {
        config.validate()?;
        crate::init_logging(&config.log_filter);
        let store = SqliteImportStore::connect(&config.database_url).await?;
        Self::new(Arc::new(store), scope, config)
    }

        pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn scope(&self) -> OrgScope {
        self.scope
    }

    pub fn parse(&self, file: &[u8], format: SourceFormat) -> Result<ParseResult> {
        let _span = tracing::info_span!("import_parse", session_id = %self.session_id).entered();
        self.parser.parse(file, format)
    }

    /// Same as `parse`, with the format taken from the file extension
    pub fn parse_file(&self, file_name: &str, file: &[u8]) -> Result<ParseResult> {
        let format = SourceFormat::from_file_name(file_name).ok_or_else(|| {
            AppError::ParseError(format!("Unsupported file type: {}", file_name))
        })?;
        self.parse(file, format)
    }

    /// Suggested mapping for the operator to confirm or edit
    pub fn auto_mapping(&self, headers: &[String], domain: ImportDomain) -> ColumnMapping {
        ColumnMapping::auto_detect(headers, domain)
    }

    pub fn map_rows<I: CandidateInput>(
        &self,
        rows: &[Row],
        mapping: &ColumnMapping,
    ) -> Vec<Candidate<I>> {
        field_mapper::map_rows(rows, mapping)
    }

    pub async fn validate<R: DomainRules>(
        &self,
        rules: &R,
        candidates: Vec<Candidate<R::Input>>,
    ) -> Result<ValidationResult<R::Input>> {
        let domain = <R::Input as CandidateInput>::DOMAIN;
        let span = tracing::info_span!(
            "import_validate",
            session_id = %self.session_id,
            domain = %domain,
        );
        Validator::new(self.store.as_ref(), self.scope, &self.phones)
            .validate(rules, candidates)
            .instrument(span)
            .await
    }

    /// Effect of committing `approved(validation)`; held-back merges are not counted
    pub fn simulate<I>(&self, validation: &ValidationResult<I>) -> SimulationResult {
        if self.config.include_merges_in_commit {
            simulator::simulate(&validation.valid, &validation.to_merge)
        } else {
            simulator::simulate(&validation.valid, &[])
        }
    }

    /// Records a confirmed commit should write, honoring `include_merges_in_commit`
    pub fn approved<I: Clone>(&self, validation: &ValidationResult<I>) -> Vec<ApprovedRecord<I>> {
        validation.approved(self.config.include_merges_in_commit)
    }

    pub async fn commit<R, F>(
        &self,
        rules: &R,
        records: Vec<ApprovedRecord<R::Input>>,
        on_progress: F,
    ) -> Result<CommitResult>
    where
        R: DomainRules,
        F: FnMut(CommitProgress) -> Result<()>,
    {
        let domain = <R::Input as CandidateInput>::DOMAIN;
        let span = tracing::info_span!(
            "import_commit",
            session_id = %self.session_id,
            domain = %domain,
            records = records.len(),
        );
        Committer::new(self.store.as_ref(), self.scope)
            .commit(rules, records, on_progress)
            .instrument(span)
            .await
    }

    pub fn donor_rules(&self) -> DonorRules {
        DonorRules::new(self.config.merge_policy)
    }

    pub fn pledge_rules(&self) -> PledgeRules {
        PledgeRules::new()
    }

    pub fn yahrzeit_rules(&self) -> YahrzeitRules {
        YahrzeitRules::new(self.phones.clone())
    }

    pub fn template(&self, domain: ImportDomain) -> Result<Vec<u8>> {
        templates::template_csv(domain)
    }

    /// Result log covering every input row, including ones validation kept back
    pub fn full_report<I: CandidateInput>(
        &self,
        validation: &ValidationResult<I>,
        commit: &CommitResult,
    ) -> Result<Vec<u8>> {
        result_exporter::full_report(validation, &commit.outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::{fields, DonorFields, DonorInput, PledgeInput};

    const ORG: OrgScope = OrgScope { organization_id: 11 };

    async fn use_case() -> (Arc<SqliteImportStore>, ImportUseCase) {
        let store = Arc::new(SqliteImportStore::in_memory().await.unwrap());
        let use_case = ImportUseCase::new(store.clone(), ORG, ImportConfig::default()).unwrap();
        (store, use_case)
    }

    #[tokio::test]
    async fn test_donor_csv_end_to_end() {
        let (store, import) = use_case().await;
        store
            .insert_donor(
                &ORG,
                &DonorFields {
                    phone: "0503333333".to_string(),
                    normalized_phone: "0503333333".to_string(),
                    first_name: Some("Dovid".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let csv = "Phone,First Name,Last Name,Email\n\
                   050-111-1111,Moshe,Cohen,moshe@example.org\n\
                   050 222 2222,Rivka,Levi,not-an-email\n\
                   +972 50 333 3333,,Katz,dovid@example.org\n\
                   0504444444,Sara,,\n";
        let parsed = import.parse_file("donors.csv", csv.as_bytes()).unwrap();
        assert_eq!(parsed.row_count(), 4);

        let mapping = import.auto_mapping(&parsed.headers, ImportDomain::Donor);
        assert_eq!(mapping.source_for(fields::FIRST_NAME), Some("First Name"));

        let rules = import.donor_rules();
        let candidates = import.map_rows::<DonorInput>(&parsed.rows, &mapping);
        let validation = import.validate(&rules, candidates).await.unwrap();
        assert_eq!(validation.valid.len(), 2);
        assert_eq!(validation.to_merge.len(), 1);
        assert_eq!(validation.errors.len(), 1);

        let simulation = import.simulate(&validation);
        assert_eq!(simulation.to_add, 3);
        assert_eq!(simulation.to_merge, 1);

        let result = import
            .commit(&rules, import.approved(&validation), |_| Ok(()))
            .await
            .unwrap();
        assert_eq!(result.added, 2);
        assert_eq!(result.merged, 1);
        assert_eq!(store.count_donors(&ORG).await.unwrap(), 3);

        let merged = store
            .find_donor_by_normalized_phone(&ORG, "0503333333")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(merged.fields.first_name.as_deref(), Some("Dovid"));
        assert_eq!(merged.fields.email.as_deref(), Some("dovid@example.org"));

        let report = String::from_utf8(import.full_report(&validation, &result).unwrap()).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("3,050 222 2222,rejected,email:"));
        assert!(lines[3].contains(",merged,"));
    }

    #[tokio::test]
    async fn test_unmapped_required_field_rejects_every_row() {
        let (store, import) = use_case().await;
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

        let csv = "Phone,Amount\n0501111111,100\n0501111111,250\n";
        let parsed = import.parse(csv.as_bytes(), SourceFormat::Csv).unwrap();
        let mapping = import
            .auto_mapping(&parsed.headers, ImportDomain::Pledge)
            .unmap(fields::TOTAL_AMOUNT);
        assert_eq!(mapping.source_for(fields::TOTAL_AMOUNT), None);
        assert_eq!(mapping.unmapped_required(ImportDomain::Pledge), vec![fields::TOTAL_AMOUNT]);

        let candidates = import.map_rows::<PledgeInput>(&parsed.rows, &mapping);
        let validation = import.validate(&import.pledge_rules(), candidates).await.unwrap();

        assert!(validation.valid.is_empty());
        assert!(validation.link_failed.is_empty());
        assert_eq!(validation.errors.len(), 2);
        assert!(validation
            .errors
            .iter()
            .all(|r| r.errors.iter().any(|e| e.field == fields::TOTAL_AMOUNT)));
    }

    #[tokio::test]
    async fn test_merges_can_be_held_back() {
        let store = Arc::new(SqliteImportStore::in_memory().await.unwrap());
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
        let config = ImportConfig {
            include_merges_in_commit: false,
            ..ImportConfig::default()
        };
        let import = ImportUseCase::new(store.clone(), ORG, config).unwrap();

        let parsed = import
            .parse(b"phone\n0501111111\n0502222222\n", SourceFormat::Csv)
            .unwrap();
        let mapping = import.auto_mapping(&parsed.headers, ImportDomain::Donor);
        let candidates = import.map_rows::<DonorInput>(&parsed.rows, &mapping);
        let validation = import.validate(&import.donor_rules(), candidates).await.unwrap();

        let approved = import.approved(&validation);
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].candidate.index, 1);

        let simulation = import.simulate(&validation);
        assert_eq!(simulation.to_add, approved.len());
        assert_eq!(simulation.to_create, 1);
        assert_eq!(simulation.to_merge, 0);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let store = Arc::new(SqliteImportStore::in_memory().await.unwrap());
        let config = ImportConfig {
            max_rows: 0,
            ..ImportConfig::default()
        };
        assert!(ImportUseCase::new(store, ORG, config).is_err());
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let (_, import) = use_case().await;
        let err = import.parse_file("donors.pdf", b"%PDF").unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_connect_opens_configured_database() {
        let path = std::env::temp_dir().join(format!("donor-import-{}.db", Uuid::new_v4()));
        let config = ImportConfig {
            database_url: format!("sqlite://{}", path.display()),
            log_filter: "warn".to_string(),
            ..ImportConfig::default()
        };

        let import = ImportUseCase::connect(ORG, config).await.unwrap();
        let parsed = import.parse(b"phone\n0501111111\n", SourceFormat::Csv).unwrap();
        let mapping = import.auto_mapping(&parsed.headers, ImportDomain::Donor);
        let rules = import.donor_rules();
        let candidates = import.map_rows::<DonorInput>(&parsed.rows, &mapping);
        let validation = import.validate(&rules, candidates).await.unwrap();
        let result = import
            .commit(&rules, import.approved(&validation), |_| Ok(()))
            .await
            .unwrap();
        assert_eq!(result.added, 1);
        assert!(path.exists());

        drop(import);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_database_url() {
        let config = ImportConfig {
            database_url: "sqlite:///no-such-directory/donors.db".to_string(),
            ..ImportConfig::default()
        };
        assert!(ImportUseCase::connect(ORG, config).await.is_err());
    }
}
