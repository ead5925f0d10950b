//! Configuration and runtime wiring

mod config;

pub use config::Config;
