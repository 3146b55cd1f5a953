//! CLI subcommand implementations.

pub mod employees;
pub mod records;
pub mod report;
pub mod scan;
pub mod settings;
pub mod status;
pub mod util;
