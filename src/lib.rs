pub mod application;
pub mod domain;
pub mod infrastructure;

pub use crate::application::use_cases::result_exporter::to_csv;
pub use crate::application::use_cases::templates::template_csv;
pub use crate::application::{
    Committer, DomainRules, DonorRules, ImportUseCase, PhoneNormalizer, PledgeRules, Validator,
    YahrzeitRules,
};
pub use crate::domain::error::{AppError, Result};
pub use crate::domain::import::*;
pub use crate::infrastructure::config::ImportConfig;
pub use crate::infrastructure::db::{ImportStore, SqliteImportStore};
pub use crate::infrastructure::tabular::TabularParser;

/// Install the global `tracing` subscriber. Safe to call more than once.
pub fn init_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .try_init();
}
