//! In-memory store
//!
//! Implements every repository trait over a single lock, so multi-record
//! commits are atomic with respect to each other. Records keep insertion
//! order.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EquipmentRepository, MotorRepository, UserRepository};
use crate::models::{
    equipment::{AssignmentPlan, Equipment, RemovalPlan},
    motor::{MaintenanceEvent, Motor, MotorStatus},
    user::User,
};
use crate::utils::errors::{duplicate_key_error, not_found_error, AppError, AppResult};

#[derive(Debug, Default)]
struct MemoryState {
    motors: Vec<Motor>,
    equipment: Vec<Equipment>,
    users: Vec<User>,
}

impl MemoryState {
    fn motor_mut(&mut self, id: Uuid) -> AppResult<&mut Motor> {
        self.motors
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| not_found_error("Motor"))
    }

    fn equipment_mut(&mut self, id: Uuid) -> AppResult<&mut Equipment> {
        self.equipment
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found_error("Equipment"))
    }

    fn motor_status(&self, id: Uuid) -> Option<MotorStatus> {
        self.motors.iter().find(|m| m.id == id).map(|m| m.status)
    }

    fn set_motor_status(&mut self, id: Uuid, status: MotorStatus, at: chrono::DateTime<chrono::Utc>) {
        // the evicted motor may have been deleted in the meantime
        if let Some(motor) = self.motors.iter_mut().find(|m| m.id == id) {
            motor.status = status;
            motor.updated_at = at;
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MotorRepository for MemoryStore {
    async fn list(&self, status: Option<MotorStatus>) -> AppResult<Vec<Motor>> {
        let state = self.state.read().await;
        Ok(state
            .motors
            .iter()
            .filter(|m| status.map_or(true, |s| m.status == s))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Motor>> {
        let state = self.state.read().await;
        Ok(state.motors.iter().find(|m| m.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Motor>> {
        let state = self.state.read().await;
        Ok(state
            .motors
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn insert(&self, motor: &Motor) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.motors.iter().any(|m| m.serial_number == motor.serial_number) {
            return Err(duplicate_key_error("motor", "serial number", &motor.serial_number));
        }
        state.motors.push(motor.clone());
        Ok(())
    }

    async fn update(&self, motor: &Motor, status: Option<MotorStatus>) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .motors
            .iter()
            .any(|m| m.id != motor.id && m.serial_number == motor.serial_number)
        {
            return Err(duplicate_key_error("motor", "serial number", &motor.serial_number));
        }

        let stored = state.motor_mut(motor.id)?;
        stored.serial_number = motor.serial_number.clone();
        stored.specs = motor.specs.clone();
        if let Some(status) = status {
            stored.status = status;
        }
        stored.updated_at = motor.updated_at;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        let index = state
            .motors
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| not_found_error("Motor"))?;

        if state.motors[index].status == MotorStatus::Active {
            return Err(AppError::InvalidState(
                "Cannot delete an active motor. Please mark it as spare first.".to_string(),
            ));
        }

        let now = chrono::Utc::now();
        for equipment in state.equipment.iter_mut() {
            equipment.detach_motor(id, now);
        }
        state.motors.remove(index);
        Ok(())
    }

    async fn add_event(&self, motor_id: Uuid, event: &MaintenanceEvent) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.motor_mut(motor_id)?.push_maintenance(event.clone());
        Ok(())
    }

    async fn update_event(&self, motor_id: Uuid, event: &MaintenanceEvent) -> AppResult<()> {
        let mut state = self.state.write().await;
        let motor = state.motor_mut(motor_id)?;
        let stored = motor
            .find_event_mut(event.id)
            .ok_or_else(|| not_found_error("Maintenance event"))?;
        *stored = event.clone();
        Ok(())
    }

    async fn delete_event(&self, motor_id: Uuid, event_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .motor_mut(motor_id)?
            .remove_event(event_id)
            .map(|_| ())
            .ok_or_else(|| not_found_error("Maintenance event"))
    }
}

#[async_trait]
impl EquipmentRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let state = self.state.read().await;
        Ok(state.equipment.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        let state = self.state.read().await;
        Ok(state.equipment.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_motor(&self, motor_id: Uuid) -> AppResult<Option<Equipment>> {
        let state = self.state.read().await;
        Ok(state
            .equipment
            .iter()
            .find(|e| e.current_motor_id == Some(motor_id))
            .cloned())
    }

    async fn insert(&self, equipment: &Equipment) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.equipment.iter().any(|e| e.ton_number == equipment.ton_number) {
            return Err(duplicate_key_error("equipment", "TON number", &equipment.ton_number));
        }
        state.equipment.push(equipment.clone());
        Ok(())
    }

    async fn update_details(&self, equipment: &Equipment) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state
            .equipment
            .iter()
            .any(|e| e.id != equipment.id && e.ton_number == equipment.ton_number)
        {
            return Err(duplicate_key_error("equipment", "TON number", &equipment.ton_number));
        }

        let stored = state.equipment_mut(equipment.id)?;
        stored.ton_number = equipment.ton_number.clone();
        stored.designation = equipment.designation.clone();
        stored.plant = equipment.plant.clone();
        stored.updated_at = equipment.updated_at;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        let index = state
            .equipment
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| not_found_error("Equipment"))?;

        state.equipment[index].ensure_deletable()?;
        state.equipment.remove(index);
        Ok(())
    }

    async fn commit_assignment(&self, plan: &AssignmentPlan) -> AppResult<()> {
        let mut state = self.state.write().await;

        match state.motor_status(plan.incoming_motor_id) {
            None => return Err(not_found_error("Motor")),
            Some(MotorStatus::Spare) => {}
            // the evicted motor is flipped to spare below, so re-installing it is fine
            Some(_) if plan.evicted_motor_id == Some(plan.incoming_motor_id) => {}
            Some(_) => {
                return Err(AppError::InvalidState(
                    "Motor is no longer a spare".to_string(),
                ))
            }
        }

        let equipment = state.equipment_mut(plan.equipment_id)?;
        if equipment.current_motor_id != plan.evicted_motor_id {
            return Err(AppError::InvalidState(
                "Equipment was modified concurrently, please retry".to_string(),
            ));
        }
        equipment.apply_assignment(plan);

        if let Some(evicted) = plan.evicted_motor_id {
            state.set_motor_status(evicted, MotorStatus::Spare, plan.at);
        }
        state.set_motor_status(plan.incoming_motor_id, MotorStatus::Active, plan.at);
        Ok(())
    }

    async fn commit_removal(&self, plan: &RemovalPlan) -> AppResult<()> {
        let mut state = self.state.write().await;

        let equipment = state.equipment_mut(plan.equipment_id)?;
        if equipment.current_motor_id != Some(plan.motor_id) {
            return Err(AppError::InvalidState(
                "Equipment was modified concurrently, please retry".to_string(),
            ));
        }
        equipment.apply_removal(plan);

        state.set_motor_status(plan.motor_id, MotorStatus::Spare, plan.at);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(duplicate_key_error("user", "email", &user.email));
        }
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(duplicate_key_error("user", "username", &user.username));
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state.users.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::motor::MotorSpecs;
    use chrono::Utc;

    async fn seeded() -> (MemoryStore, Equipment, Motor, Motor) {
        let store = MemoryStore::new();
        let m1 = Motor::new("S/N-1".into(), MotorSpecs::default(), MotorStatus::Spare);
        let m2 = Motor::new("S/N-2".into(), MotorSpecs::default(), MotorStatus::Spare);
        let e = Equipment::new("TON-100".into(), "Pump".into(), "Plant A".into());
        MotorRepository::insert(&store, &m1).await.unwrap();
        MotorRepository::insert(&store, &m2).await.unwrap();
        EquipmentRepository::insert(&store, &e).await.unwrap();
        (store, e, m1, m2)
    }

    async fn status(store: &MemoryStore, id: Uuid) -> MotorStatus {
        MotorRepository::find_by_id(store, id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_duplicate_serial_number() {
        let (store, _, _, _) = seeded().await;
        let dup = Motor::new("S/N-1".into(), MotorSpecs::default(), MotorStatus::Spare);
        assert!(matches!(
            MotorRepository::insert(&store, &dup).await,
            Err(AppError::DuplicateKey(_))
        ));
    }

    #[tokio::test]
    async fn test_commit_assignment_and_eviction() {
        let (store, e, m1, m2) = seeded().await;

        let plan = e.plan_assignment(&m1, Utc::now()).unwrap();
        store.commit_assignment(&plan).await.unwrap();
        assert_eq!(status(&store, m1.id).await, MotorStatus::Active);

        let e = EquipmentRepository::find_by_id(&store, e.id).await.unwrap().unwrap();
        let m2 = MotorRepository::find_by_id(&store, m2.id).await.unwrap().unwrap();
        let plan = e.plan_assignment(&m2, Utc::now()).unwrap();
        store.commit_assignment(&plan).await.unwrap();

        assert_eq!(status(&store, m1.id).await, MotorStatus::Spare);
        assert_eq!(status(&store, m2.id).await, MotorStatus::Active);
        let e = store.find_by_motor(m2.id).await.unwrap().unwrap();
        assert_eq!(e.open_installations().count(), 1);
    }

    #[tokio::test]
    async fn test_stale_plan_is_rejected_without_mutation() {
        let (store, e, m1, _) = seeded().await;
        let other = Equipment::new("TON-200".into(), "Fan".into(), "Plant A".into());
        EquipmentRepository::insert(&store, &other).await.unwrap();

        // both plans observe m1 as spare; only the first may win
        let first = e.plan_assignment(&m1, Utc::now()).unwrap();
        let second = other.plan_assignment(&m1, Utc::now()).unwrap();
        store.commit_assignment(&first).await.unwrap();

        assert!(matches!(
            store.commit_assignment(&second).await,
            Err(AppError::InvalidState(_))
        ));
        let other = EquipmentRepository::find_by_id(&store, other.id).await.unwrap().unwrap();
        assert_eq!(other.current_motor_id, None);
        assert!(other.motor_history.is_empty());
    }

    #[tokio::test]
    async fn test_delete_guards() {
        let (store, e, m1, _) = seeded().await;
        let plan = e.plan_assignment(&m1, Utc::now()).unwrap();
        store.commit_assignment(&plan).await.unwrap();

        assert!(matches!(
            MotorRepository::delete(&store, m1.id).await,
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(
            EquipmentRepository::delete(&store, e.id).await,
            Err(AppError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_deleting_detached_spare_clears_pointer() {
        let (store, e, m1, _) = seeded().await;
        let plan = e.plan_assignment(&m1, Utc::now()).unwrap();
        store.commit_assignment(&plan).await.unwrap();

        // administrative escape hatch: status flipped without the workflow
        let mut motor = MotorRepository::find_by_id(&store, m1.id).await.unwrap().unwrap();
        MotorRepository::update(&store, &motor, Some(MotorStatus::Spare))
            .await
            .unwrap();
        MotorRepository::delete(&store, m1.id).await.unwrap();

        let e = EquipmentRepository::find_by_id(&store, e.id).await.unwrap().unwrap();
        assert_eq!(e.current_motor_id, None);
        assert_eq!(e.open_installations().count(), 0);
    }

    #[tokio::test]
    async fn test_attribute_update_keeps_workflow_fields() {
        let (store, e, m1, _) = seeded().await;
        let other = Equipment::new("TON-200".into(), "Fan".into(), "Plant A".into());
        EquipmentRepository::insert(&store, &other).await.unwrap();

        // read before the assignment and the maintenance entry land
        let mut stale = MotorRepository::find_by_id(&store, m1.id).await.unwrap().unwrap();

        let plan = e.plan_assignment(&m1, Utc::now()).unwrap();
        store.commit_assignment(&plan).await.unwrap();
        let serviced = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        store
            .add_event(m1.id, &MaintenanceEvent::new(serviced, "Greasing".into()))
            .await
            .unwrap();

        stale.specs.note = Some("Noisy bearing".into());
        stale.updated_at = Utc::now();
        MotorRepository::update(&store, &stale, None).await.unwrap();

        let motor = MotorRepository::find_by_id(&store, m1.id).await.unwrap().unwrap();
        assert_eq!(motor.status, MotorStatus::Active);
        assert_eq!(motor.last_maintenance_date, Some(serviced));
        assert_eq!(motor.specs.note.as_deref(), Some("Noisy bearing"));

        // the stale copy still says spare, the store does not
        let second = other.plan_assignment(&stale, Utc::now()).unwrap();
        assert!(matches!(
            store.commit_assignment(&second).await,
            Err(AppError::InvalidState(_))
        ));
        assert_eq!(store.find_by_motor(m1.id).await.unwrap().unwrap().id, e.id);
    }

    #[tokio::test]
    async fn test_maintenance_events() {
        let (store, _, m1, _) = seeded().await;
        let event = MaintenanceEvent::new(
            chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            "Rewind".into(),
        );
        store.add_event(m1.id, &event).await.unwrap();

        let motor = MotorRepository::find_by_id(&store, m1.id).await.unwrap().unwrap();
        assert_eq!(motor.last_maintenance_date, Some(event.date));
        assert_eq!(motor.maintenance_history, vec![event.clone()]);

        assert!(matches!(
            store.delete_event(m1.id, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        store.delete_event(m1.id, event.id).await.unwrap();
    }
}
