pub mod use_cases;

pub use use_cases::committer::Committer;
pub use use_cases::import_pipeline::ImportUseCase;
pub use use_cases::validator::{
    DomainRules, DonorRules, PhoneNormalizer, PledgeRules, Validator, YahrzeitRules,
};
