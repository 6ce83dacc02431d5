//! Deployment tasks for cross-chain messaging contracts: deterministic
//! (optionally proxied) deployment, proxy upgrades and fee quotes.

pub mod command_line;
pub mod constants;
pub mod contracts;
pub mod deploy;
pub mod error;
pub mod network;
pub mod options;
pub mod store;
pub mod tasks;
pub mod types;
pub mod utils;
