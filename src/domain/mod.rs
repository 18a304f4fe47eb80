pub mod error;
pub mod import;
