//! Configuration management for Ferry.
//!
//! Settings ([`settings::Config`]) are stored as a TOML file and loaded at
//! startup.

pub mod settings;
