pub mod audit;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod live;
pub mod password;
pub mod session;
pub mod switcher;
pub mod usage;
pub mod vault;
