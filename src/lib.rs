//! Search debugger command line
//!
//! Exposes modules for integration testing

pub mod adapters;
pub mod cli;
pub mod config;

pub use config::AppConfig;
