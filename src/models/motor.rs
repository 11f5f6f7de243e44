//! Motor model
//!
//! A physical motor tracked by serial number, with its lifecycle status and
//! maintenance log.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};

/// Motor lifecycle status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MotorStatus {
    /// Installed on a piece of equipment
    Active,
    #[default]
    Spare,
    /// Administrative override, never set by the assignment workflow
    OutOfService,
}

impl MotorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotorStatus::Active => "active",
            MotorStatus::Spare => "spare",
            MotorStatus::OutOfService => "out_of_service",
        }
    }
}

impl fmt::Display for MotorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotorStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MotorStatus::Active),
            "spare" => Ok(MotorStatus::Spare),
            // the legacy dashboard spells it with spaces
            "out_of_service" | "out of service" => Ok(MotorStatus::OutOfService),
            other => Err(AppError::ValidationError(format!(
                "Unknown motor status '{}'",
                other
            ))),
        }
    }
}

/// One entry of a motor's maintenance log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceEvent {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
}

impl MaintenanceEvent {
    pub fn new(date: NaiveDate, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            description,
        }
    }
}

/// Descriptive attributes; no cross-field invariants
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MotorSpecs {
    pub motor_type: Option<String>,
    pub manufacturer: Option<String>,
    pub power: Option<String>,
    pub current: Option<String>,
    /// RPM
    pub speed: Option<f64>,
    /// IM mounting code
    pub mounting: Option<String>,
    pub frame_size: Option<String>,
    pub bearing_de: Option<String>,
    pub bearing_nde: Option<String>,
    pub warehouse: Option<String>,
    pub sap_id: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Motor {
    pub id: Uuid,
    pub serial_number: String,
    #[serde(flatten)]
    pub specs: MotorSpecs,
    pub status: MotorStatus,
    pub last_maintenance_date: Option<NaiveDate>,
    /// Insertion order, newest insert first; not necessarily chronological
    pub maintenance_history: Vec<MaintenanceEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Motor {
    pub fn new(serial_number: String, specs: MotorSpecs, status: MotorStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            serial_number,
            specs,
            status,
            last_maintenance_date: None,
            maintenance_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_spare(&self) -> bool {
        self.status == MotorStatus::Spare
    }

    /// An active motor cannot be deleted
    pub fn ensure_deletable(&self) -> AppResult<()> {
        if self.status == MotorStatus::Active {
            return Err(AppError::InvalidState(
                "Cannot delete an active motor. Please mark it as spare first.".to_string(),
            ));
        }
        Ok(())
    }

    /// Only spare motors may be installed
    pub fn ensure_assignable(&self) -> AppResult<()> {
        if !self.is_spare() {
            return Err(AppError::InvalidState(format!(
                "Motor {} is not a spare (status: {})",
                self.serial_number, self.status
            )));
        }
        Ok(())
    }

    /// Prepend a maintenance event and overwrite `last_maintenance_date` with
    /// its date, even when an existing event is more recent
    pub fn record_maintenance(&mut self, date: NaiveDate, description: String) -> &MaintenanceEvent {
        self.push_maintenance(MaintenanceEvent::new(date, description))
    }

    /// Same as `record_maintenance` for an event built elsewhere
    pub fn push_maintenance(&mut self, event: MaintenanceEvent) -> &MaintenanceEvent {
        self.last_maintenance_date = Some(event.date);
        self.maintenance_history.insert(0, event);
        self.updated_at = Utc::now();
        &self.maintenance_history[0]
    }

    pub fn find_event_mut(&mut self, event_id: Uuid) -> Option<&mut MaintenanceEvent> {
        self.maintenance_history.iter_mut().find(|e| e.id == event_id)
    }

    pub fn remove_event(&mut self, event_id: Uuid) -> Option<MaintenanceEvent> {
        let index = self.maintenance_history.iter().position(|e| e.id == event_id)?;
        self.updated_at = Utc::now();
        Some(self.maintenance_history.remove(index))
    }

    /// Maintenance log sorted by date, newest first
    pub fn history_by_date(&self) -> Vec<&MaintenanceEvent> {
        let mut events: Vec<&MaintenanceEvent> = self.maintenance_history.iter().collect();
        events.sort_by(|a, b| b.date.cmp(&a.date));
        events
    }
}
