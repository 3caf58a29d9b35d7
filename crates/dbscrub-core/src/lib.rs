//! Anonymization engine for the collaboration platform database.
//!
//! The engine replaces every piece of identifying data (names, emails,
//! logins, free text) with deterministic, template-generated placeholders
//! while preserving the relational structure, so the scrubbed database
//! stays internally consistent and usable for testing. User domains backed
//! by an external directory are converted in place into SQL-backed domains
//! with newly minted, stable identifiers.
//!
//! The whole run executes inside one transaction: a failure in any unit of
//! work rolls back everything. The SSV audit files are the only side effect
//! that survives a failed run.
//!
//! # Example
//!
//! ```rust,no_run
//! use dbscrub_core::{Config, run, UnitProgress};
//!
//! # fn example() -> Result<(), dbscrub_core::ScrubError> {
//! let config = Config::from_toml("")?;
//! let summary = run(&config, |progress| {
//!     if let UnitProgress::Completed(unit, rows) = progress {
//!         println!("{unit}: {rows} rows");
//!     }
//! })?;
//! println!("{} domains processed", summary.domains);
//! # Ok(())
//! # }
//! ```

pub mod components;
pub mod config;
pub mod descriptor;
pub mod domains;
pub mod error;
pub mod groups;
pub mod hierarchy;
pub mod ident;
pub mod migrate;
pub mod model;
pub mod naming;
pub mod nodes;
pub mod publications;
pub mod run;
pub mod spaces;
pub mod ssv;
pub mod store;
pub mod users;

#[cfg(test)]
mod testutil;

pub use config::{Config, ConfigError};
pub use error::ScrubError;
pub use run::{RunSummary, UnitProgress, run};
