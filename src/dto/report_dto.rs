use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Placeholder for equipment columns of a motor no equipment points at
pub const NOT_AVAILABLE: &str = "N/A";

// One row of the active motor report
#[derive(Debug, Clone, Serialize)]
pub struct ActiveMotorRow {
    pub motor_id: Uuid,
    pub ton_number: String,
    pub designation: String,
    pub serial_number: String,
    pub power: Option<String>,
    pub speed: Option<f64>,
    pub current: Option<String>,
    pub mounting: Option<String>,
    pub frame_size: Option<String>,
    pub bearing_nde: Option<String>,
    pub bearing_de: Option<String>,
    pub last_maintenance_date: Option<NaiveDate>,
}

// Reports available to the caller
#[derive(Debug, Serialize)]
pub struct ReportDescriptor {
    pub name: &'static str,
    pub path: &'static str,
    pub formats: &'static [&'static str],
}
