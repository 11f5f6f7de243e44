use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use super::EquipmentRepository;
use crate::models::equipment::{AssignmentPlan, Equipment, MotorInstallation, RemovalPlan};
use crate::models::motor::MotorStatus;
use crate::utils::errors::{
    duplicate_key_error, map_foreign_key_violation, map_unique_violation, not_found_error,
    AppError, AppResult,
};

const EQUIPMENT_COLUMNS: &str =
    "id, ton_number, designation, plant, current_motor_id, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct EquipmentRow {
    id: Uuid,
    ton_number: String,
    designation: String,
    plant: String,
    current_motor_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct InstallationRow {
    id: Uuid,
    equipment_id: Uuid,
    motor_id: Uuid,
    assigned_at: DateTime<Utc>,
    removed_at: Option<DateTime<Utc>>,
}

fn stale_equipment() -> AppError {
    AppError::InvalidState("Equipment was modified concurrently, please retry".to_string())
}

pub struct PgEquipmentRepository {
    pool: PgPool,
}

impl PgEquipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, rows: Vec<EquipmentRow>) -> AppResult<Vec<Equipment>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let installations = sqlx::query_as::<_, InstallationRow>(
            "SELECT id, equipment_id, motor_id, assigned_at, removed_at FROM motor_installations \
             WHERE equipment_id = ANY($1) ORDER BY seq",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_equipment: HashMap<Uuid, Vec<MotorInstallation>> = HashMap::new();
        for row in installations {
            by_equipment
                .entry(row.equipment_id)
                .or_default()
                .push(MotorInstallation {
                    id: row.id,
                    motor_id: row.motor_id,
                    assigned_at: row.assigned_at,
                    removed_at: row.removed_at,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| Equipment {
                motor_history: by_equipment.remove(&row.id).unwrap_or_default(),
                id: row.id,
                ton_number: row.ton_number,
                designation: row.designation,
                plant: row.plant,
                current_motor_id: row.current_motor_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Tell a vanished record apart from a lost compare-and-swap
    async fn stale_or_missing(
        tx: &mut Transaction<'_, Postgres>,
        equipment_id: Uuid,
    ) -> AppResult<AppError> {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM equipment WHERE id = $1")
            .bind(equipment_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(match exists {
            Some(_) => stale_equipment(),
            None => not_found_error("Equipment"),
        })
    }

    async fn close_open_entry(
        tx: &mut Transaction<'_, Postgres>,
        equipment_id: Uuid,
        motor_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        // zero rows is data drift and is tolerated
        sqlx::query(
            "UPDATE motor_installations SET removed_at = $3 \
             WHERE equipment_id = $1 AND motor_id = $2 AND removed_at IS NULL",
        )
        .bind(equipment_id)
        .bind(motor_id)
        .bind(at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn set_motor_status(
        tx: &mut Transaction<'_, Postgres>,
        motor_id: Uuid,
        status: MotorStatus,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE motors SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(motor_id)
            .bind(status.as_str())
            .bind(at)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EquipmentRepository for PgEquipmentRepository {
    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, EquipmentRow>(&format!(
            "SELECT {} FROM equipment ORDER BY created_at, id",
            EQUIPMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, EquipmentRow>(&format!(
            "SELECT {} FROM equipment WHERE id = $1",
            EQUIPMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_motor(&self, motor_id: Uuid) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, EquipmentRow>(&format!(
            "SELECT {} FROM equipment WHERE current_motor_id = $1 LIMIT 1",
            EQUIPMENT_COLUMNS
        ))
        .bind(motor_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert(&self, equipment: &Equipment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO equipment (id, ton_number, designation, plant, current_motor_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(equipment.id)
        .bind(&equipment.ton_number)
        .bind(&equipment.designation)
        .bind(&equipment.plant)
        .bind(equipment.current_motor_id)
        .bind(equipment.created_at)
        .bind(equipment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                duplicate_key_error("equipment", "TON number", &equipment.ton_number)
            })
        })?;

        Ok(())
    }

    async fn update_details(&self, equipment: &Equipment) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET ton_number = $2, designation = $3, plant = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(equipment.id)
        .bind(&equipment.ton_number)
        .bind(&equipment.designation)
        .bind(&equipment.plant)
        .bind(equipment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                duplicate_key_error("equipment", "TON number", &equipment.ton_number)
            })
        })?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Equipment"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(Option<Uuid>,)> =
            sqlx::query_as("SELECT current_motor_id FROM equipment WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        match current {
            None => return Err(not_found_error("Equipment")),
            Some((Some(_),)) => {
                return Err(AppError::InvalidState(
                    "Cannot delete equipment with an active motor. Please remove it first."
                        .to_string(),
                ))
            }
            Some((None,)) => {}
        }

        sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn commit_assignment(&self, plan: &AssignmentPlan) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let swapped = sqlx::query(
            "UPDATE equipment SET current_motor_id = $2, updated_at = $3 \
             WHERE id = $1 AND current_motor_id IS NOT DISTINCT FROM $4",
        )
        .bind(plan.equipment_id)
        .bind(plan.incoming_motor_id)
        .bind(plan.at)
        .bind(plan.evicted_motor_id)
        .execute(&mut *tx)
        .await
        // the incoming motor was deleted after the plan was built
        .map_err(|err| map_foreign_key_violation(err, || not_found_error("Motor")))?;

        if swapped.rows_affected() == 0 {
            return Err(Self::stale_or_missing(&mut tx, plan.equipment_id).await?);
        }

        if let Some(evicted) = plan.evicted_motor_id {
            Self::set_motor_status(&mut tx, evicted, MotorStatus::Spare, plan.at).await?;
        }

        let claimed = sqlx::query(
            "UPDATE motors SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4",
        )
        .bind(plan.incoming_motor_id)
        .bind(MotorStatus::Active.as_str())
        .bind(plan.at)
        .bind(MotorStatus::Spare.as_str())
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            // dropping the transaction rolls back the equipment swap
            let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM motors WHERE id = $1")
                .bind(plan.incoming_motor_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match exists {
                Some(_) => AppError::InvalidState("Motor is no longer a spare".to_string()),
                None => not_found_error("Motor"),
            });
        }

        if let Some(evicted) = plan.evicted_motor_id {
            Self::close_open_entry(&mut tx, plan.equipment_id, evicted, plan.at).await?;
        }

        sqlx::query(
            "INSERT INTO motor_installations (id, equipment_id, motor_id, assigned_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(plan.installation_id)
        .bind(plan.equipment_id)
        .bind(plan.incoming_motor_id)
        .bind(plan.at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, stale_equipment))?;

        tx.commit().await?;
        Ok(())
    }

    async fn commit_removal(&self, plan: &RemovalPlan) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let swapped = sqlx::query(
            "UPDATE equipment SET current_motor_id = NULL, updated_at = $3 \
             WHERE id = $1 AND current_motor_id = $2",
        )
        .bind(plan.equipment_id)
        .bind(plan.motor_id)
        .bind(plan.at)
        .execute(&mut *tx)
        .await?;

        if swapped.rows_affected() == 0 {
            return Err(Self::stale_or_missing(&mut tx, plan.equipment_id).await?);
        }

        Self::close_open_entry(&mut tx, plan.equipment_id, plan.motor_id, plan.at).await?;
        Self::set_motor_status(&mut tx, plan.motor_id, MotorStatus::Spare, plan.at).await?;

        tx.commit().await?;
        Ok(())
    }
}
