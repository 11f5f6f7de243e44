use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::equipment_dto::{
    AssignMotorRequest, CreateEquipmentRequest, EquipmentLocation, EquipmentResponse,
    MotorSummary, UpdateEquipmentRequest,
};
use crate::dto::ApiResponse;
use crate::models::equipment::Equipment;
use crate::repositories::{EquipmentRepository, MotorRepository};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct EquipmentController {
    equipment: Arc<dyn EquipmentRepository>,
    motors: Arc<dyn MotorRepository>,
}

impl EquipmentController {
    pub fn new(state: &AppState) -> Self {
        Self {
            equipment: state.equipment.clone(),
            motors: state.motors.clone(),
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<Equipment> {
        self.equipment
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Equipment"))
    }

    /// Attach motor summaries to the installed motor and every history entry
    async fn resolve(&self, items: Vec<Equipment>) -> AppResult<Vec<EquipmentResponse>> {
        let mut ids: Vec<Uuid> = items
            .iter()
            .flat_map(|e| {
                e.current_motor_id
                    .into_iter()
                    .chain(e.motor_history.iter().map(|h| h.motor_id))
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let motors: HashMap<Uuid, MotorSummary> = self
            .motors
            .find_many(&ids)
            .await?
            .iter()
            .map(|m| (m.id, MotorSummary::from(m)))
            .collect();

        Ok(items
            .into_iter()
            .map(|e| EquipmentResponse::new(e, &motors))
            .collect())
    }

    async fn resolve_one(&self, equipment: Equipment) -> AppResult<EquipmentResponse> {
        self.resolve(vec![equipment])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Equipment vanished while resolving".to_string()))
    }

    pub async fn list(&self) -> AppResult<ApiResponse<Vec<EquipmentResponse>>> {
        let items = self.equipment.list().await?;
        Ok(ApiResponse::list(self.resolve(items).await?))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<EquipmentResponse>> {
        let equipment = self.find(id).await?;
        Ok(ApiResponse::success(self.resolve_one(equipment).await?))
    }

    pub async fn create(&self, request: CreateEquipmentRequest) -> AppResult<ApiResponse<EquipmentResponse>> {
        request.validate()?;

        let equipment = Equipment::new(
            request.ton_number.trim().to_string(),
            request.designation.trim().to_string(),
            request.plant.trim().to_string(),
        );
        self.equipment.insert(&equipment).await?;

        tracing::info!(equipment_id = %equipment.id, ton_number = %equipment.ton_number, "Equipment created");
        Ok(ApiResponse::success(self.resolve_one(equipment).await?))
    }

    pub async fn update(&self, id: Uuid, request: UpdateEquipmentRequest) -> AppResult<ApiResponse<EquipmentResponse>> {
        request.validate()?;
        let mut equipment = self.find(id).await?;

        for (field, value, target) in [
            ("ton_number", request.ton_number, &mut equipment.ton_number),
            ("designation", request.designation, &mut equipment.designation),
            ("plant", request.plant, &mut equipment.plant),
        ] {
            if let Some(value) = value {
                let value = value.trim();
                if value.is_empty() {
                    return Err(AppError::ValidationError(format!("{} cannot be blank", field)));
                }
                *target = value.to_string();
            }
        }

        equipment.updated_at = Utc::now();
        self.equipment.update_details(&equipment).await?;

        tracing::info!(equipment_id = %equipment.id, "Equipment updated");
        Ok(ApiResponse::success(self.resolve_one(equipment).await?))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
        let equipment = self.find(id).await?;
        equipment.ensure_deletable()?;

        self.equipment.delete(id).await?;

        tracing::info!(equipment_id = %id, ton_number = %equipment.ton_number, "Equipment deleted");
        Ok(ApiResponse::success(serde_json::json!({})))
    }

    /// Install a spare motor, evicting the current one back to spare.
    /// Loses with `InvalidState`, and changes nothing, when a concurrent
    /// request claimed the motor or changed the equipment first.
    pub async fn assign_motor(&self, id: Uuid, request: AssignMotorRequest) -> AppResult<ApiResponse<EquipmentResponse>> {
        let motor_id = request
            .motor_id
            .ok_or_else(|| AppError::ValidationError("Please provide a motor_id".to_string()))?;

        let equipment = self.find(id).await?;
        let motor = self
            .motors
            .find_by_id(motor_id)
            .await?
            .ok_or_else(|| not_found_error("Motor"))?;

        let plan = equipment.plan_assignment(&motor, Utc::now())?;
        self.equipment.commit_assignment(&plan).await?;

        tracing::info!(
            equipment_id = %plan.equipment_id,
            motor_id = %plan.incoming_motor_id,
            evicted_motor_id = ?plan.evicted_motor_id,
            "Motor assigned"
        );

        let equipment = self.find(id).await?;
        Ok(ApiResponse::success_with_message(
            self.resolve_one(equipment).await?,
            "Motor assigned successfully",
        ))
    }

    /// Uninstall the current motor and return it to spare
    pub async fn remove_motor(&self, id: Uuid) -> AppResult<ApiResponse<EquipmentResponse>> {
        let equipment = self.find(id).await?;
        let plan = equipment.plan_removal(Utc::now())?;
        self.equipment.commit_removal(&plan).await?;

        tracing::info!(equipment_id = %plan.equipment_id, motor_id = %plan.motor_id, "Motor removed");

        let equipment = self.find(id).await?;
        Ok(ApiResponse::success_with_message(
            self.resolve_one(equipment).await?,
            "Motor removed successfully",
        ))
    }

    /// Equipment the motor is currently installed on
    pub async fn find_by_motor(&self, motor_id: Uuid) -> AppResult<ApiResponse<EquipmentLocation>> {
        let equipment = self
            .equipment
            .find_by_motor(motor_id)
            .await?
            .ok_or_else(|| not_found_error("Equipment"))?;
        Ok(ApiResponse::success(EquipmentLocation::from(equipment)))
    }
}
