pub mod config;
pub mod db;

// CSV / XLSX reading
pub mod tabular;
