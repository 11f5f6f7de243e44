use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};

use crate::controllers::report_controller::{ExportFile, ReportController};
use crate::dto::report_dto::{ActiveMotorRow, ReportDescriptor};
use crate::dto::ApiResponse;
use crate::middleware::auth::{authorize, AuthenticatedUser};
use crate::models::user::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;

const EDITORS: &[Role] = &[Role::Admin, Role::Manager];

pub fn create_report_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports))
        .route("/active-motors", get(active_motors))
        .route("/active-motors/export-excel", get(export_excel))
        .route("/active-motors/export-pdf", get(export_pdf))
}

impl IntoResponse for ExportFile {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

async fn list_reports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<&'static ReportDescriptor>>>, AppError> {
    authorize(&user, EDITORS)?;
    Ok(Json(ReportController::new(&state).index()))
}

async fn active_motors(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ActiveMotorRow>>>, AppError> {
    let controller = ReportController::new(&state);
    Ok(Json(controller.active_motors().await?))
}

async fn export_excel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ExportFile, AppError> {
    authorize(&user, EDITORS)?;
    ReportController::new(&state).export_excel().await
}

async fn export_pdf(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ExportFile, AppError> {
    authorize(&user, EDITORS)?;
    ReportController::new(&state).export_pdf().await
}
