use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::Value;
use uuid::Uuid;

use crate::controllers::equipment_controller::EquipmentController;
use crate::dto::equipment_dto::{
    AssignMotorRequest, CreateEquipmentRequest, EquipmentLocation, EquipmentResponse,
    UpdateEquipmentRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::{authorize, AuthenticatedUser};
use crate::models::user::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;

const EDITORS: &[Role] = &[Role::Admin, Role::Manager];
const ADMINS: &[Role] = &[Role::Admin];

pub fn create_equipment_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_equipment).post(create_equipment))
        .route("/by-motor/:motor_id", get(equipment_for_motor))
        .route("/:id", get(get_equipment).put(update_equipment).delete(delete_equipment))
        .route("/:id/assign-motor", post(assign_motor))
        .route("/:id/remove-motor", post(remove_motor))
}

async fn list_equipment(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<EquipmentResponse>>>, AppError> {
    let controller = EquipmentController::new(&state);
    Ok(Json(controller.list().await?))
}

async fn create_equipment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateEquipmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EquipmentResponse>>), AppError> {
    authorize(&user, ADMINS)?;
    let controller = EquipmentController::new(&state);
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EquipmentResponse>>, AppError> {
    let controller = EquipmentController::new(&state);
    Ok(Json(controller.get(id).await?))
}

async fn update_equipment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEquipmentRequest>,
) -> Result<Json<ApiResponse<EquipmentResponse>>, AppError> {
    authorize(&user, EDITORS)?;
    let controller = EquipmentController::new(&state);
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_equipment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    authorize(&user, ADMINS)?;
    let controller = EquipmentController::new(&state);
    Ok(Json(controller.delete(id).await?))
}

async fn assign_motor(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignMotorRequest>,
) -> Result<Json<ApiResponse<EquipmentResponse>>, AppError> {
    authorize(&user, EDITORS)?;
    let controller = EquipmentController::new(&state);
    Ok(Json(controller.assign_motor(id, request).await?))
}

async fn remove_motor(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EquipmentResponse>>, AppError> {
    authorize(&user, EDITORS)?;
    let controller = EquipmentController::new(&state);
    Ok(Json(controller.remove_motor(id).await?))
}

async fn equipment_for_motor(
    State(state): State<AppState>,
    Path(motor_id): Path<Uuid>,
) -> Result<Json<ApiResponse<EquipmentLocation>>, AppError> {
    let controller = EquipmentController::new(&state);
    Ok(Json(controller.find_by_motor(motor_id).await?))
}
