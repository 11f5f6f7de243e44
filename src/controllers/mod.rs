//! Controllers
//!
//! Request-level business logic, one controller per resource. Controllers are
//! built per request from the shared state and return wire DTOs.

pub mod auth_controller;
pub mod equipment_controller;
pub mod maintenance_controller;
pub mod motor_controller;
pub mod report_controller;
