//! Cifra - personal expense tracker for the terminal
//!
//! Record categorized expenses month by month and see how much of your
//! salary they take.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (profile, categories, expenses, month keys)
//! - `storage`: JSON table storage scoped to the owning user
//! - `audit`: Audit logging system
//! - `services`: Business logic layer
//! - `state`: Session, month and category accessors used by the commands
//! - `aggregate`: Dashboard totals and breakdowns
//! - `auth`: Identity metadata and the sign-in callback redirect
//! - `export`: JSON backups and CSV export
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use cifra::config::CifraPaths;
//! use cifra::state::AppContext;
//!
//! let ctx = AppContext::load(CifraPaths::new()?)?;
//! let session = ctx.session();
//! ```

pub mod aggregate;
pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

pub use error::{CifraError, CifraResult};
