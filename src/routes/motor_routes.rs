use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde_json::Value;
use uuid::Uuid;

use crate::controllers::{maintenance_controller::MaintenanceController, motor_controller::MotorController};
use crate::dto::motor_dto::{CreateMotorRequest, MaintenanceEventRequest, MotorQuery, UpdateMotorRequest};
use crate::dto::ApiResponse;
use crate::middleware::auth::{authorize, AuthenticatedUser};
use crate::models::motor::{MaintenanceEvent, Motor};
use crate::models::user::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;

const EDITORS: &[Role] = &[Role::Admin, Role::Manager];
const ADMINS: &[Role] = &[Role::Admin];

pub fn create_motor_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_motors).post(create_motor))
        .route("/:id", get(get_motor).put(update_motor).delete(delete_motor))
        .route("/:id/maintenance", get(list_events).post(add_event))
        .route("/:id/maintenance/:event_id", put(update_event).delete(delete_event))
}

async fn list_motors(
    State(state): State<AppState>,
    Query(query): Query<MotorQuery>,
) -> Result<Json<ApiResponse<Vec<Motor>>>, AppError> {
    let controller = MotorController::new(&state);
    Ok(Json(controller.list(query).await?))
}

async fn create_motor(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateMotorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Motor>>), AppError> {
    authorize(&user, ADMINS)?;
    let controller = MotorController::new(&state);
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_motor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Motor>>, AppError> {
    let controller = MotorController::new(&state);
    Ok(Json(controller.get(id).await?))
}

async fn update_motor(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMotorRequest>,
) -> Result<Json<ApiResponse<Motor>>, AppError> {
    authorize(&user, EDITORS)?;
    let controller = MotorController::new(&state);
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_motor(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    authorize(&user, ADMINS)?;
    let controller = MotorController::new(&state);
    Ok(Json(controller.delete(id).await?))
}

// Maintenance log

async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<MaintenanceEvent>>>, AppError> {
    let controller = MaintenanceController::new(&state);
    Ok(Json(controller.list(id).await?))
}

async fn add_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<MaintenanceEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Motor>>), AppError> {
    authorize(&user, EDITORS)?;
    let controller = MaintenanceController::new(&state);
    let response = controller.add(id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, event_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<MaintenanceEventRequest>,
) -> Result<Json<ApiResponse<Motor>>, AppError> {
    authorize(&user, EDITORS)?;
    let controller = MaintenanceController::new(&state);
    Ok(Json(controller.update(id, event_id, request).await?))
}

async fn delete_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<Motor>>, AppError> {
    authorize(&user, ADMINS)?;
    let controller = MaintenanceController::new(&state);
    Ok(Json(controller.delete(id, event_id).await?))
}
