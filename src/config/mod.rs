//! Configuration module for Cifra
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::CifraPaths;
pub use settings::Settings;
