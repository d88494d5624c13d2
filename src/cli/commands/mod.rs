pub mod audit_cmd;
pub mod completions;
pub mod current;
pub mod delete;
pub mod export;
pub mod import_cmd;
pub mod list;
pub mod password;
pub mod save;
pub mod status;
pub mod switch;
pub mod usage;
