//! Equipment model
//!
//! Plant equipment hosts at most one motor at a time. The installation
//! history is append-only: an entry is opened when a motor is assigned and
//! closed (never removed) when that motor is evicted.
//!
//! Assignment and removal are split into a *plan*, computed from a snapshot
//! of the records, and its application. Repositories commit a plan
//! atomically and re-check the snapshot it was computed from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::motor::Motor;
use crate::utils::errors::{AppError, AppResult};

/// One installation period of a motor on a piece of equipment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotorInstallation {
    pub id: Uuid,
    pub motor_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl MotorInstallation {
    pub fn is_open(&self) -> bool {
        self.removed_at.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub id: Uuid,
    /// External asset number
    pub ton_number: String,
    pub designation: String,
    pub plant: String,
    pub current_motor_id: Option<Uuid>,
    pub motor_history: Vec<MotorInstallation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Install `incoming_motor_id`, evicting whatever was observed as installed
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPlan {
    pub equipment_id: Uuid,
    pub incoming_motor_id: Uuid,
    /// Motor observed in `current_motor_id` when the plan was made
    pub evicted_motor_id: Option<Uuid>,
    pub installation_id: Uuid,
    pub at: DateTime<Utc>,
}

/// Uninstall `motor_id` from `equipment_id`
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalPlan {
    pub equipment_id: Uuid,
    pub motor_id: Uuid,
    pub at: DateTime<Utc>,
}

impl Equipment {
    pub fn new(ton_number: String, designation: String, plant: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ton_number,
            designation,
            plant,
            current_motor_id: None,
            motor_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn open_installations(&self) -> impl Iterator<Item = &MotorInstallation> {
        self.motor_history.iter().filter(|h| h.is_open())
    }

    /// Equipment with an installed motor cannot be deleted
    pub fn ensure_deletable(&self) -> AppResult<()> {
        if self.current_motor_id.is_some() {
            return Err(AppError::InvalidState(
                "Cannot delete equipment with an active motor. Please remove it first.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn plan_assignment(&self, motor: &Motor, at: DateTime<Utc>) -> AppResult<AssignmentPlan> {
        motor.ensure_assignable()?;

        Ok(AssignmentPlan {
            equipment_id: self.id,
            incoming_motor_id: motor.id,
            evicted_motor_id: self.current_motor_id,
            installation_id: Uuid::new_v4(),
            at,
        })
    }

    /// Close the evicted motor's open entry (if it can be found), point at the
    /// incoming motor and open its entry
    pub fn apply_assignment(&mut self, plan: &AssignmentPlan) {
        if let Some(evicted) = plan.evicted_motor_id {
            self.close_open_entry(evicted, plan.at);
        }

        self.current_motor_id = Some(plan.incoming_motor_id);
        self.motor_history.push(MotorInstallation {
            id: plan.installation_id,
            motor_id: plan.incoming_motor_id,
            assigned_at: plan.at,
            removed_at: None,
        });
        self.updated_at = plan.at;
    }

    pub fn plan_removal(&self, at: DateTime<Utc>) -> AppResult<RemovalPlan> {
        let motor_id = self.current_motor_id.ok_or_else(|| {
            AppError::InvalidState("No motor is installed on this equipment".to_string())
        })?;

        Ok(RemovalPlan {
            equipment_id: self.id,
            motor_id,
            at,
        })
    }

    pub fn apply_removal(&mut self, plan: &RemovalPlan) {
        self.close_open_entry(plan.motor_id, plan.at);
        self.current_motor_id = None;
        self.updated_at = plan.at;
    }

    /// Forget a deleted motor: close its open entries and clear the pointer
    pub fn detach_motor(&mut self, motor_id: Uuid, at: DateTime<Utc>) {
        for entry in self
            .motor_history
            .iter_mut()
            .filter(|h| h.motor_id == motor_id && h.is_open())
        {
            entry.removed_at = Some(at);
        }
        if self.current_motor_id == Some(motor_id) {
            self.current_motor_id = None;
            self.updated_at = at;
        }
    }

    // A missing open entry (data drift) is tolerated silently.
    fn close_open_entry(&mut self, motor_id: Uuid, at: DateTime<Utc>) {
        if let Some(entry) = self
            .motor_history
            .iter_mut()
            .find(|h| h.motor_id == motor_id && h.is_open())
        {
            entry.removed_at = Some(at);
        }
    }
}
