//! Services
//!
//! Report rendering. Business rules live in the models and controllers.

pub mod report_export;
