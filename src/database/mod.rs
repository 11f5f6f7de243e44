//! Database module
//!
//! PostgreSQL connection and schema migrations.

pub mod connection;

pub use connection::{connect, mask_database_url};
