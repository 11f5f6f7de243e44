//! Request and response bodies

pub mod api_response;
pub mod auth_dto;
pub mod equipment_dto;
pub mod motor_dto;
pub mod report_dto;

pub use api_response::ApiResponse;
