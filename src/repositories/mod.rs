//! Persistence
//!
//! One trait per aggregate. The `Pg*` repositories are the production
//! backend; `MemoryStore` backs local development and the test-suite.

pub mod equipment_repository;
pub mod memory;
pub mod motor_repository;
pub mod user_repository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    equipment::{AssignmentPlan, Equipment, RemovalPlan},
    motor::{MaintenanceEvent, Motor, MotorStatus},
    user::User,
};
use crate::utils::errors::AppResult;

pub use equipment_repository::PgEquipmentRepository;
pub use memory::MemoryStore;
pub use motor_repository::PgMotorRepository;
pub use user_repository::PgUserRepository;

#[async_trait]
pub trait MotorRepository: Send + Sync {
    async fn list(&self, status: Option<MotorStatus>) -> AppResult<Vec<Motor>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Motor>>;

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Motor>>;

    /// Fails with `DuplicateKey` when the serial number is taken
    async fn insert(&self, motor: &Motor) -> AppResult<()>;

    /// Persists serial number and attributes. Status is written only when
    /// `status` is given; the last maintenance date is never touched here.
    async fn update(&self, motor: &Motor, status: Option<MotorStatus>) -> AppResult<()>;

    /// Deletes the motor, closing its open installations and clearing any
    /// equipment pointer that still references it
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Prepends `event` and sets `last_maintenance_date` to its date
    async fn add_event(&self, motor_id: Uuid, event: &MaintenanceEvent) -> AppResult<()>;

    async fn update_event(&self, motor_id: Uuid, event: &MaintenanceEvent) -> AppResult<()>;

    async fn delete_event(&self, motor_id: Uuid, event_id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Equipment>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Equipment>>;

    /// Equipment whose current motor is `motor_id`
    async fn find_by_motor(&self, motor_id: Uuid) -> AppResult<Option<Equipment>>;

    /// Fails with `DuplicateKey` when the TON number is taken
    async fn insert(&self, equipment: &Equipment) -> AppResult<()>;

    /// Persists TON number, designation and plant only
    async fn update_details(&self, equipment: &Equipment) -> AppResult<()>;

    /// Fails with `InvalidState` if a motor is installed at commit time
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Commits an assignment atomically. Fails with `InvalidState`, leaving
    /// every record untouched, when the incoming motor is no longer spare or
    /// the equipment no longer holds `plan.evicted_motor_id`.
    async fn commit_assignment(&self, plan: &AssignmentPlan) -> AppResult<()>;

    /// Commits a removal atomically, with the same staleness guard
    async fn commit_removal(&self, plan: &RemovalPlan) -> AppResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Fails with `DuplicateKey` when the username or email is taken
    async fn insert(&self, user: &User) -> AppResult<()>;

    async fn count(&self) -> AppResult<i64>;
}
