//! Wallet notification scheduler: bootstrap, settings and CLI.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod wallet;

pub use bootstrap::{build_scheduler, init_foundation};
