use serde::Deserialize;
use validator::Validate;

use crate::models::motor::MotorSpecs;
use crate::utils::validation::validate_not_blank;

// Request to register a motor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMotorRequest {
    #[serde(default)]
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub serial_number: String,
    #[serde(flatten)]
    pub specs: MotorSpecs,
    /// Defaults to `spare`
    pub status: Option<String>,
}

// Request to update a motor; absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMotorRequest {
    #[validate(length(min = 1, max = 100))]
    pub serial_number: Option<String>,
    pub status: Option<String>,
    pub motor_type: Option<String>,
    pub manufacturer: Option<String>,
    pub power: Option<String>,
    pub current: Option<String>,
    #[validate(range(min = 0.0))]
    pub speed: Option<f64>,
    pub mounting: Option<String>,
    pub frame_size: Option<String>,
    pub bearing_de: Option<String>,
    pub bearing_nde: Option<String>,
    pub warehouse: Option<String>,
    pub sap_id: Option<String>,
    pub note: Option<String>,
}

impl UpdateMotorRequest {
    pub fn merge_specs(&mut self, specs: &mut MotorSpecs) {
        merge(&mut specs.motor_type, self.motor_type.take());
        merge(&mut specs.manufacturer, self.manufacturer.take());
        merge(&mut specs.power, self.power.take());
        merge(&mut specs.current, self.current.take());
        if self.speed.is_some() {
            specs.speed = self.speed;
        }
        merge(&mut specs.mounting, self.mounting.take());
        merge(&mut specs.frame_size, self.frame_size.take());
        merge(&mut specs.bearing_de, self.bearing_de.take());
        merge(&mut specs.bearing_nde, self.bearing_nde.take());
        merge(&mut specs.warehouse, self.warehouse.take());
        merge(&mut specs.sap_id, self.sap_id.take());
        merge(&mut specs.note, self.note.take());
    }
}

fn merge(target: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *target = value;
    }
}

// Query string of the motor listing
#[derive(Debug, Default, Deserialize)]
pub struct MotorQuery {
    pub status: Option<String>,
}

// Body of add/update maintenance event
#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceEventRequest {
    pub date: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut specs = MotorSpecs {
            manufacturer: Some("ABB".into()),
            power: Some("10 HP".into()),
            ..MotorSpecs::default()
        };
        let mut request = UpdateMotorRequest {
            power: Some("15 HP".into()),
            speed: Some(1450.0),
            ..UpdateMotorRequest::default()
        };

        request.merge_specs(&mut specs);

        assert_eq!(specs.manufacturer.as_deref(), Some("ABB"));
        assert_eq!(specs.power.as_deref(), Some("15 HP"));
        assert_eq!(specs.speed, Some(1450.0));
    }

    #[test]
    fn test_blank_serial_number_is_rejected() {
        let request: CreateMotorRequest =
            serde_json::from_value(serde_json::json!({ "serial_number": "  ", "power": "5 HP" }))
                .unwrap();
        assert!(request.validate().is_err());
        assert_eq!(request.specs.power.as_deref(), Some("5 HP"));
    }
}
