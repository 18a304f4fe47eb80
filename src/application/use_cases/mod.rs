pub mod committer;
pub mod field_mapper;
pub mod import_pipeline;
pub mod result_exporter;
pub mod simulator;
pub mod templates;
pub mod validator;
