use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::motor_dto::{CreateMotorRequest, MotorQuery, UpdateMotorRequest};
use crate::dto::ApiResponse;
use crate::models::motor::{Motor, MotorStatus};
use crate::repositories::MotorRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::non_blank;

pub struct MotorController {
    motors: Arc<dyn MotorRepository>,
}

impl MotorController {
    pub fn new(state: &AppState) -> Self {
        Self {
            motors: state.motors.clone(),
        }
    }

    pub async fn find(&self, id: Uuid) -> AppResult<Motor> {
        self.motors
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Motor"))
    }

    pub async fn list(&self, query: MotorQuery) -> AppResult<ApiResponse<Vec<Motor>>> {
        let status = non_blank(query.status.as_deref())
            .map(str::parse::<MotorStatus>)
            .transpose()?;

        let motors = self.motors.list(status).await?;
        Ok(ApiResponse::list(motors))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<Motor>> {
        Ok(ApiResponse::success(self.find(id).await?))
    }

    pub async fn create(&self, request: CreateMotorRequest) -> AppResult<ApiResponse<Motor>> {
        request.validate()?;

        let status = match non_blank(request.status.as_deref()) {
            Some(raw) => raw.parse::<MotorStatus>()?,
            None => MotorStatus::default(),
        };

        let motor = Motor::new(
            request.serial_number.trim().to_string(),
            request.specs,
            status,
        );
        self.motors.insert(&motor).await?;

        tracing::info!(motor_id = %motor.id, serial_number = %motor.serial_number, "Motor created");
        Ok(ApiResponse::success(motor))
    }

    /// Merge the supplied fields. Status may be changed directly; this
    /// bypasses the assignment workflow on purpose.
    pub async fn update(&self, id: Uuid, mut request: UpdateMotorRequest) -> AppResult<ApiResponse<Motor>> {
        request.validate()?;
        let mut motor = self.find(id).await?;

        if let Some(serial_number) = request.serial_number.take() {
            let serial_number = serial_number.trim();
            if serial_number.is_empty() {
                return Err(AppError::ValidationError(
                    "Please add a serial number".to_string(),
                ));
            }
            motor.serial_number = serial_number.to_string();
        }

        let mut requested_status = None;
        if let Some(raw) = non_blank(request.status.as_deref()) {
            let status = raw.parse::<MotorStatus>()?;
            if status != motor.status {
                tracing::warn!(
                    motor_id = %motor.id,
                    from = %motor.status,
                    to = %status,
                    "Motor status changed outside the assignment workflow"
                );
            }
            requested_status = Some(status);
        }

        request.merge_specs(&mut motor.specs);
        motor.updated_at = Utc::now();
        self.motors.update(&motor, requested_status).await?;

        tracing::info!(motor_id = %motor.id, "Motor updated");
        // reload so the response carries workflow fields committed meanwhile
        Ok(ApiResponse::success(self.find(id).await?))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
        let motor = self.find(id).await?;
        motor.ensure_deletable()?;

        self.motors.delete(id).await?;

        tracing::info!(motor_id = %id, serial_number = %motor.serial_number, "Motor deleted");
        Ok(ApiResponse::success(serde_json::json!({})))
    }
}
