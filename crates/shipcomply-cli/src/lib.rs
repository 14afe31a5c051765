//! # shipcomply-cli: Shipment Compliance Command-Line Interface
//!
//! ## Subcommands
//!
//! - `seed`: install the default catalog into an empty store
//! - `reset`: clear the store and reinstall the defaults
//! - `validate <file>`: field validation plus cross-border checks
//! - `rules`: list active rules
//! - `import <file>`: bulk reference-data import (YAML or JSON)
//! - `country <text>`: normalize a country name or code
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers return an exit code.
//! - Handlers delegate to the library crates. No compliance logic here.

pub mod catalog;
pub mod config;
pub mod country;
pub mod setup;
pub mod validate;
