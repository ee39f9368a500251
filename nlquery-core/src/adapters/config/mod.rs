//! Configuration types for database adapters.
//!
//! These structs intentionally do NOT store passwords or credentials.

mod connection;

pub use connection::ConnectionConfig;
