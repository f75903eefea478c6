//! One module per subcommand.

pub mod audit_cmd;
pub mod backup;
pub mod completions;
pub mod delete;
pub mod export;
pub mod get;
pub mod import_cmd;
pub mod list;
pub mod set;
pub mod show;
