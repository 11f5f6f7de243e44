//! Domain models
//!
//! Records and the state transitions that are valid on them.

pub mod equipment;
pub mod motor;
pub mod user;
