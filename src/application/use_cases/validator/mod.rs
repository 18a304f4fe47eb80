mod donor;
mod linking;
mod phone;
mod pledge;
mod rules;
mod values;
mod yahrzeit;

pub use donor::DonorRules;
pub use phone::PhoneNormalizer;
pub use pledge::PledgeRules;
pub use rules::DomainRules;
pub use values::{is_valid_email, parse_amount, parse_iso_date};
pub use yahrzeit::YahrzeitRules;

use crate::domain::import::OrgScope;
use crate::infrastructure::db::ImportStore;

/// Classifies candidates into valid / toMerge / linkFailed / errors.
/// Reads the store, never writes it.
pub struct Validator<'a> {
    store: &'a dyn ImportStore,
    scope: OrgScope,
    phones: &'a PhoneNormalizer,
}

impl<'a> Validator<'a> {
    pub fn new(store: &'a dyn ImportStore, scope: OrgScope, phones: &'a PhoneNormalizer) -> Self {
        Self {
            store,
            scope,
            phones,
        }
    }
}
