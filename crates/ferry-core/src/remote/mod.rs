//! Access to the remote file-transfer backend.
//!
//! - [`transport`] sends one HTTP request and normalizes every outcome.
//! - [`session`] holds the single active connection descriptor.
//! - [`client`] is the catalog of typed remote operations.
//! - [`entry`], [`envelope`] and [`path`] are the shared data types.

pub mod client;
pub mod entry;
pub mod envelope;
pub mod path;
pub mod session;
pub mod transport;
