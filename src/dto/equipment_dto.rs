use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::models::equipment::Equipment;
use crate::models::motor::Motor;
use crate::utils::validation::validate_not_blank;

// Request to register equipment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEquipmentRequest {
    #[serde(default)]
    #[validate(custom = "validate_not_blank")]
    pub ton_number: String,
    #[serde(default)]
    #[validate(custom = "validate_not_blank")]
    pub designation: String,
    #[serde(default)]
    #[validate(custom = "validate_not_blank")]
    pub plant: String,
}

// Request to update equipment details; the installed motor is not editable here
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateEquipmentRequest {
    #[validate(length(min = 1))]
    pub ton_number: Option<String>,
    #[validate(length(min = 1))]
    pub designation: Option<String>,
    #[validate(length(min = 1))]
    pub plant: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignMotorRequest {
    #[serde(alias = "motorId")]
    pub motor_id: Option<Uuid>,
}

/// Short description of a motor attached to equipment views
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MotorSummary {
    pub id: Uuid,
    pub serial_number: String,
    pub manufacturer: Option<String>,
    pub motor_type: Option<String>,
}

impl From<&Motor> for MotorSummary {
    fn from(motor: &Motor) -> Self {
        Self {
            id: motor.id,
            serial_number: motor.serial_number.clone(),
            manufacturer: motor.specs.manufacturer.clone(),
            motor_type: motor.specs.motor_type.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InstallationResponse {
    pub id: Uuid,
    pub motor_id: Uuid,
    /// `None` once the motor has been deleted
    pub motor: Option<MotorSummary>,
    pub assigned_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
}

// Equipment with its motors resolved
#[derive(Debug, Serialize)]
pub struct EquipmentResponse {
    pub id: Uuid,
    pub ton_number: String,
    pub designation: String,
    pub plant: String,
    pub current_motor_id: Option<Uuid>,
    pub current_motor: Option<MotorSummary>,
    pub motor_history: Vec<InstallationResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EquipmentResponse {
    pub fn new(equipment: Equipment, motors: &HashMap<Uuid, MotorSummary>) -> Self {
        let lookup = |id: Uuid| motors.get(&id).cloned();

        Self {
            current_motor: equipment.current_motor_id.and_then(lookup),
            motor_history: equipment
                .motor_history
                .into_iter()
                .map(|entry| InstallationResponse {
                    motor: lookup(entry.motor_id),
                    id: entry.id,
                    motor_id: entry.motor_id,
                    assigned_at: entry.assigned_at,
                    removed_at: entry.removed_at,
                })
                .collect(),
            id: equipment.id,
            ton_number: equipment.ton_number,
            designation: equipment.designation,
            plant: equipment.plant,
            current_motor_id: equipment.current_motor_id,
            created_at: equipment.created_at,
            updated_at: equipment.updated_at,
        }
    }
}

// Where a motor is installed
#[derive(Debug, Serialize)]
pub struct EquipmentLocation {
    pub id: Uuid,
    pub ton_number: String,
    pub designation: String,
    pub plant: String,
}

impl From<Equipment> for EquipmentLocation {
    fn from(equipment: Equipment) -> Self {
        Self {
            id: equipment.id,
            ton_number: equipment.ton_number,
            designation: equipment.designation,
            plant: equipment.plant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::motor::{MotorSpecs, MotorStatus};

    #[test]
    fn test_deleted_motor_annotates_as_null() {
        let motor = Motor::new("S/N-1".into(), MotorSpecs::default(), MotorStatus::Spare);
        let ghost = Motor::new("S/N-2".into(), MotorSpecs::default(), MotorStatus::Spare);
        let mut equipment = Equipment::new("TON-100".into(), "Pump".into(), "Plant A".into());
        for m in [&ghost, &motor] {
            let plan = equipment.plan_assignment(m, Utc::now()).unwrap();
            equipment.apply_assignment(&plan);
        }

        let motors = HashMap::from([(motor.id, MotorSummary::from(&motor))]);
        let response = EquipmentResponse::new(equipment, &motors);

        assert_eq!(response.current_motor.unwrap().serial_number, "S/N-1");
        assert!(response.motor_history[0].motor.is_none());
        assert!(response.motor_history[1].motor.is_some());
    }

    #[test]
    fn test_assign_request_accepts_legacy_field_name() {
        let id = Uuid::new_v4();
        let request: AssignMotorRequest =
            serde_json::from_value(serde_json::json!({ "motorId": id })).unwrap();
        assert_eq!(request.motor_id, Some(id));
    }
}
