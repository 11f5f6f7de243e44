use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::MotorRepository;
use crate::models::motor::{MaintenanceEvent, Motor, MotorSpecs, MotorStatus};
use crate::utils::errors::{
    duplicate_key_error, map_unique_violation, not_found_error, AppError, AppResult,
};

const MOTOR_COLUMNS: &str = "id, serial_number, motor_type, manufacturer, power, current_rating, \
     speed, mounting, frame_size, bearing_de, bearing_nde, warehouse, sap_id, note, status, \
     last_maintenance_date, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct MotorRow {
    id: Uuid,
    serial_number: String,
    motor_type: Option<String>,
    manufacturer: Option<String>,
    power: Option<String>,
    current_rating: Option<String>,
    speed: Option<f64>,
    mounting: Option<String>,
    frame_size: Option<String>,
    bearing_de: Option<String>,
    bearing_nde: Option<String>,
    warehouse: Option<String>,
    sap_id: Option<String>,
    note: Option<String>,
    status: String,
    last_maintenance_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    motor_id: Uuid,
    date: NaiveDate,
    description: String,
}

impl MotorRow {
    fn into_motor(self, maintenance_history: Vec<MaintenanceEvent>) -> AppResult<Motor> {
        let status = self
            .status
            .parse::<MotorStatus>()
            .map_err(|_| AppError::Internal(format!("Corrupt motor status '{}'", self.status)))?;

        Ok(Motor {
            id: self.id,
            serial_number: self.serial_number,
            specs: MotorSpecs {
                motor_type: self.motor_type,
                manufacturer: self.manufacturer,
                power: self.power,
                current: self.current_rating,
                speed: self.speed,
                mounting: self.mounting,
                frame_size: self.frame_size,
                bearing_de: self.bearing_de,
                bearing_nde: self.bearing_nde,
                warehouse: self.warehouse,
                sap_id: self.sap_id,
                note: self.note,
            },
            status,
            last_maintenance_date: self.last_maintenance_date,
            maintenance_history,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct PgMotorRepository {
    pool: PgPool,
}

impl PgMotorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach the maintenance log to each row, newest insert first
    async fn hydrate(&self, rows: Vec<MotorRow>) -> AppResult<Vec<Motor>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let events = sqlx::query_as::<_, EventRow>(
            "SELECT id, motor_id, date, description FROM maintenance_events \
             WHERE motor_id = ANY($1) ORDER BY seq DESC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_motor: HashMap<Uuid, Vec<MaintenanceEvent>> = HashMap::new();
        for event in events {
            by_motor.entry(event.motor_id).or_default().push(MaintenanceEvent {
                id: event.id,
                date: event.date,
                description: event.description,
            });
        }

        rows.into_iter()
            .map(|row| {
                let history = by_motor.remove(&row.id).unwrap_or_default();
                row.into_motor(history)
            })
            .collect()
    }
}

#[async_trait]
impl MotorRepository for PgMotorRepository {
    async fn list(&self, status: Option<MotorStatus>) -> AppResult<Vec<Motor>> {
        let rows = sqlx::query_as::<_, MotorRow>(&format!(
            "SELECT {} FROM motors WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY created_at, id",
            MOTOR_COLUMNS
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Motor>> {
        let row = sqlx::query_as::<_, MotorRow>(&format!(
            "SELECT {} FROM motors WHERE id = $1",
            MOTOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Motor>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MotorRow>(&format!(
            "SELECT {} FROM motors WHERE id = ANY($1) ORDER BY created_at, id",
            MOTOR_COLUMNS
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn insert(&self, motor: &Motor) -> AppResult<()> {
        let specs = &motor.specs;
        sqlx::query(
            r#"
            INSERT INTO motors (
                id, serial_number, motor_type, manufacturer, power, current_rating, speed,
                mounting, frame_size, bearing_de, bearing_nde, warehouse, sap_id, note,
                status, last_maintenance_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(motor.id)
        .bind(&motor.serial_number)
        .bind(&specs.motor_type)
        .bind(&specs.manufacturer)
        .bind(&specs.power)
        .bind(&specs.current)
        .bind(specs.speed)
        .bind(&specs.mounting)
        .bind(&specs.frame_size)
        .bind(&specs.bearing_de)
        .bind(&specs.bearing_nde)
        .bind(&specs.warehouse)
        .bind(&specs.sap_id)
        .bind(&specs.note)
        .bind(motor.status.as_str())
        .bind(motor.last_maintenance_date)
        .bind(motor.created_at)
        .bind(motor.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                duplicate_key_error("motor", "serial number", &motor.serial_number)
            })
        })?;

        Ok(())
    }

    async fn update(&self, motor: &Motor, status: Option<MotorStatus>) -> AppResult<()> {
        let specs = &motor.specs;
        let result = sqlx::query(
            r#"
            UPDATE motors
            SET serial_number = $2, motor_type = $3, manufacturer = $4, power = $5,
                current_rating = $6, speed = $7, mounting = $8, frame_size = $9,
                bearing_de = $10, bearing_nde = $11, warehouse = $12, sap_id = $13, note = $14,
                status = COALESCE($15, status), updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(motor.id)
        .bind(&motor.serial_number)
        .bind(&specs.motor_type)
        .bind(&specs.manufacturer)
        .bind(&specs.power)
        .bind(&specs.current)
        .bind(specs.speed)
        .bind(&specs.mounting)
        .bind(&specs.frame_size)
        .bind(&specs.bearing_de)
        .bind(&specs.bearing_nde)
        .bind(&specs.warehouse)
        .bind(&specs.sap_id)
        .bind(&specs.note)
        .bind(status.map(|s| s.as_str()))
        .bind(motor.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                duplicate_key_error("motor", "serial number", &motor.serial_number)
            })
        })?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Motor"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let status: Option<(String,)> =
            sqlx::query_as("SELECT status FROM motors WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        match status {
            None => return Err(not_found_error("Motor")),
            Some((status,)) if status == MotorStatus::Active.as_str() => {
                return Err(AppError::InvalidState(
                    "Cannot delete an active motor. Please mark it as spare first.".to_string(),
                ))
            }
            Some(_) => {}
        }

        sqlx::query(
            "UPDATE motor_installations SET removed_at = $2 WHERE motor_id = $1 AND removed_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE equipment SET current_motor_id = NULL, updated_at = $2 WHERE current_motor_id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM motors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn add_event(&self, motor_id: Uuid, event: &MaintenanceEvent) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE motors SET last_maintenance_date = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(motor_id)
        .bind(event.date)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Motor"));
        }

        sqlx::query(
            "INSERT INTO maintenance_events (id, motor_id, date, description) VALUES ($1, $2, $3, $4)",
        )
        .bind(event.id)
        .bind(motor_id)
        .bind(event.date)
        .bind(&event.description)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_event(&self, motor_id: Uuid, event: &MaintenanceEvent) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE maintenance_events SET date = $3, description = $4 WHERE id = $1 AND motor_id = $2",
        )
        .bind(event.id)
        .bind(motor_id)
        .bind(event.date)
        .bind(&event.description)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Maintenance event"));
        }
        Ok(())
    }

    async fn delete_event(&self, motor_id: Uuid, event_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM maintenance_events WHERE id = $1 AND motor_id = $2")
            .bind(event_id)
            .bind(motor_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Maintenance event"));
        }
        Ok(())
    }
}
