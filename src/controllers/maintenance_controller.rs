use std::sync::Arc;
use uuid::Uuid;

use crate::dto::motor_dto::MaintenanceEventRequest;
use crate::dto::ApiResponse;
use crate::models::motor::{MaintenanceEvent, Motor};
use crate::repositories::MotorRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::{non_blank, parse_date_field};

pub struct MaintenanceController {
    motors: Arc<dyn MotorRepository>,
}

impl MaintenanceController {
    pub fn new(state: &AppState) -> Self {
        Self {
            motors: state.motors.clone(),
        }
    }

    async fn find_motor(&self, motor_id: Uuid) -> AppResult<Motor> {
        self.motors
            .find_by_id(motor_id)
            .await?
            .ok_or_else(|| not_found_error("Motor"))
    }

    /// Events sorted by date, newest first
    pub async fn list(&self, motor_id: Uuid) -> AppResult<ApiResponse<Vec<MaintenanceEvent>>> {
        let motor = self.find_motor(motor_id).await?;
        let events = motor.history_by_date().into_iter().cloned().collect();
        Ok(ApiResponse::list(events))
    }

    /// Prepend an event. `last_maintenance_date` always takes the new date,
    /// even when it is older than events already logged.
    pub async fn add(&self, motor_id: Uuid, request: MaintenanceEventRequest) -> AppResult<ApiResponse<Motor>> {
        let (Some(date), Some(description)) = (
            non_blank(request.date.as_deref()),
            non_blank(request.description.as_deref()),
        ) else {
            return Err(AppError::ValidationError(
                "Please provide a date and description.".to_string(),
            ));
        };
        let date = parse_date_field("date", date)?;

        let mut motor = self.find_motor(motor_id).await?;
        let event = motor.record_maintenance(date, description.to_string()).clone();
        self.motors.add_event(motor.id, &event).await?;

        tracing::info!(motor_id = %motor.id, event_id = %event.id, %date, "Maintenance event added");
        Ok(ApiResponse::success(motor))
    }

    /// Merge date and description; `last_maintenance_date` is left alone
    pub async fn update(
        &self,
        motor_id: Uuid,
        event_id: Uuid,
        request: MaintenanceEventRequest,
    ) -> AppResult<ApiResponse<Motor>> {
        let date = non_blank(request.date.as_deref())
            .map(|raw| parse_date_field("date", raw))
            .transpose()?;

        let mut motor = self.find_motor(motor_id).await?;
        let event = motor
            .find_event_mut(event_id)
            .ok_or_else(|| not_found_error("Maintenance event"))?;

        if let Some(date) = date {
            event.date = date;
        }
        if let Some(description) = non_blank(request.description.as_deref()) {
            event.description = description.to_string();
        }
        let event = event.clone();

        self.motors.update_event(motor.id, &event).await?;

        tracing::info!(motor_id = %motor.id, event_id = %event.id, "Maintenance event updated");
        Ok(ApiResponse::success(motor))
    }

    pub async fn delete(&self, motor_id: Uuid, event_id: Uuid) -> AppResult<ApiResponse<Motor>> {
        let mut motor = self.find_motor(motor_id).await?;
        motor
            .remove_event(event_id)
            .ok_or_else(|| not_found_error("Maintenance event"))?;

        self.motors.delete_event(motor.id, event_id).await?;

        tracing::info!(motor_id = %motor.id, %event_id, "Maintenance event deleted");
        Ok(ApiResponse::success(motor))
    }
}
