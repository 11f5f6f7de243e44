//! HTTP routes
//!
//! One router per resource, nested under `/api` by [`crate::create_router`].
//! Role checks run in the handlers; authentication runs in the middleware.

pub mod auth_routes;
pub mod equipment_routes;
pub mod motor_routes;
pub mod report_routes;

pub use auth_routes::create_auth_router;
pub use equipment_routes::create_equipment_router;
pub use motor_routes::create_motor_router;
pub use report_routes::create_report_router;
