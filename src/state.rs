//! Shared application state
//!
//! Handed to every handler through the Axum router. Repositories sit behind
//! trait objects so the same router runs against PostgreSQL or the
//! in-memory store.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{
    EquipmentRepository, MemoryStore, MotorRepository, PgEquipmentRepository,
    PgMotorRepository, PgUserRepository, UserRepository,
};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub motors: Arc<dyn MotorRepository>,
    pub equipment: Arc<dyn EquipmentRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self {
            config,
            motors: Arc::new(PgMotorRepository::new(pool.clone())),
            equipment: Arc::new(PgEquipmentRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(config: EnvironmentConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config,
            motors: store.clone(),
            equipment: store.clone(),
            users: store,
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::from(&self.config)
    }
}
