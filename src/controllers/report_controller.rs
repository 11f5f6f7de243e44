use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::dto::report_dto::{ActiveMotorRow, ReportDescriptor, NOT_AVAILABLE};
use crate::dto::ApiResponse;
use crate::models::equipment::Equipment;
use crate::models::motor::MotorStatus;
use crate::repositories::{EquipmentRepository, MotorRepository};
use crate::services::report_export;
use crate::state::AppState;
use crate::utils::errors::AppResult;

const REPORTS: [ReportDescriptor; 1] = [ReportDescriptor {
    name: "Active Motors",
    path: "/api/reports/active-motors",
    formats: &["json", "xlsx", "pdf"],
}];

/// A rendered export, ready to be served as an attachment
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct ReportController {
    motors: Arc<dyn MotorRepository>,
    equipment: Arc<dyn EquipmentRepository>,
}

impl ReportController {
    pub fn new(state: &AppState) -> Self {
        Self {
            motors: state.motors.clone(),
            equipment: state.equipment.clone(),
        }
    }

    pub fn index(&self) -> ApiResponse<Vec<&'static ReportDescriptor>> {
        ApiResponse::list(REPORTS.iter().collect())
    }

    /// Every active motor joined with the equipment it is installed on
    async fn rows(&self) -> AppResult<Vec<ActiveMotorRow>> {
        let motors = self.motors.list(Some(MotorStatus::Active)).await?;
        let mut installed_on: HashMap<Uuid, Equipment> = self
            .equipment
            .list()
            .await?
            .into_iter()
            .filter_map(|e| e.current_motor_id.map(|motor_id| (motor_id, e)))
            .collect();

        Ok(motors
            .into_iter()
            .map(|motor| {
                let (ton_number, designation) = match installed_on.remove(&motor.id) {
                    Some(equipment) => (equipment.ton_number, equipment.designation),
                    None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
                };
                let specs = motor.specs;

                ActiveMotorRow {
                    motor_id: motor.id,
                    ton_number,
                    designation,
                    serial_number: motor.serial_number,
                    power: specs.power,
                    speed: specs.speed,
                    current: specs.current,
                    mounting: specs.mounting,
                    frame_size: specs.frame_size,
                    bearing_nde: specs.bearing_nde,
                    bearing_de: specs.bearing_de,
                    last_maintenance_date: motor.last_maintenance_date,
                }
            })
            .collect())
    }

    pub async fn active_motors(&self) -> AppResult<ApiResponse<Vec<ActiveMotorRow>>> {
        Ok(ApiResponse::list(self.rows().await?))
    }

    pub async fn export_excel(&self) -> AppResult<ExportFile> {
        let rows = self.rows().await?;
        let bytes = report_export::active_motors_xlsx(&rows)?;

        tracing::info!(rows = rows.len(), size = bytes.len(), "📊 Excel export generated");
        Ok(ExportFile {
            filename: report_export::export_filename("xlsx", Utc::now().date_naive()),
            content_type: report_export::XLSX_CONTENT_TYPE,
            bytes,
        })
    }

    pub async fn export_pdf(&self) -> AppResult<ExportFile> {
        let rows = self.rows().await?;
        let now = Utc::now();
        let bytes = report_export::active_motors_pdf(&rows, now)?;

        tracing::info!(rows = rows.len(), size = bytes.len(), "📄 PDF export generated");
        Ok(ExportFile {
            filename: report_export::export_filename("pdf", now.date_naive()),
            content_type: report_export::PDF_CONTENT_TYPE,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::models::motor::{Motor, MotorSpecs};

    async fn insert_motor(state: &AppState, serial: &str, status: MotorStatus) -> Motor {
        let motor = Motor::new(
            serial.into(),
            MotorSpecs {
                power: Some("10 HP".into()),
                ..MotorSpecs::default()
            },
            status,
        );
        state.motors.insert(&motor).await.unwrap();
        motor
    }

    #[tokio::test]
    async fn test_rows_join_installed_equipment() {
        let state = AppState::in_memory(EnvironmentConfig::default());
        let installed = insert_motor(&state, "S/N-1", MotorStatus::Spare).await;
        insert_motor(&state, "S/N-2", MotorStatus::Spare).await;
        // active through the status override, not installed anywhere
        let orphan = insert_motor(&state, "S/N-3", MotorStatus::Active).await;

        let equipment = Equipment::new("TON-100".into(), "Cooling pump".into(), "Plant A".into());
        state.equipment.insert(&equipment).await.unwrap();
        let plan = equipment.plan_assignment(&installed, Utc::now()).unwrap();
        state.equipment.commit_assignment(&plan).await.unwrap();

        let report = ReportController::new(&state).active_motors().await.unwrap();
        assert_eq!(report.count, Some(2));

        let by_serial: HashMap<_, _> = report
            .data
            .iter()
            .map(|r| (r.serial_number.as_str(), r))
            .collect();
        assert_eq!(by_serial["S/N-1"].ton_number, "TON-100");
        assert_eq!(by_serial["S/N-1"].power.as_deref(), Some("10 HP"));
        assert_eq!(by_serial["S/N-3"].ton_number, NOT_AVAILABLE);
        assert_eq!(by_serial["S/N-3"].motor_id, orphan.id);
    }

    #[tokio::test]
    async fn test_exports_name_files_by_date() {
        let state = AppState::in_memory(EnvironmentConfig::default());
        let controller = ReportController::new(&state);

        let excel = controller.export_excel().await.unwrap();
        assert!(excel.filename.starts_with("active-motors-"));
        assert!(excel.filename.ends_with(".xlsx"));
        assert!(excel.bytes.starts_with(b"PK"));

        let pdf = controller.export_pdf().await.unwrap();
        assert_eq!(pdf.content_type, "application/pdf");
        assert!(pdf.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_index_lists_active_motor_report() {
        let state = AppState::in_memory(EnvironmentConfig::default());
        let index = ReportController::new(&state).index();
        assert_eq!(index.count, Some(1));
        assert_eq!(index.data[0].path, "/api/reports/active-motors");
    }
}
