//! Repository tests against a live PostgreSQL.
//!
//! Run with `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.

use chrono::Utc;
use std::env;
use uuid::Uuid;

use motor_tracker::config::{database::DatabaseConfig, EnvironmentConfig};
use motor_tracker::database;
use motor_tracker::models::equipment::Equipment;
use motor_tracker::models::motor::{MaintenanceEvent, Motor, MotorSpecs, MotorStatus};
use motor_tracker::state::AppState;
use motor_tracker::utils::errors::AppError;

async fn setup_state() -> AppState {
    let url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://motor_tracker@localhost:5432/motor_tracker_test".to_string()
    });
    let pool = database::connect(&DatabaseConfig::new(url, 5))
        .await
        .expect("Failed to connect to test DB");
    AppState::new(pool, EnvironmentConfig::default())
}

// unique per run so tests can share one database
fn tag(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

async fn spare_motor(state: &AppState) -> Motor {
    let motor = Motor::new(tag("S/N"), MotorSpecs::default(), MotorStatus::Spare);
    state.motors.insert(&motor).await.unwrap();
    motor
}

#[tokio::test]
#[ignore]
async fn test_assignment_swaps_motors_atomically() {
    let state = setup_state().await;
    let first = spare_motor(&state).await;
    let second = spare_motor(&state).await;
    let equipment = Equipment::new(tag("TON"), "Cooling pump".into(), "Plant A".into());
    state.equipment.insert(&equipment).await.unwrap();

    let plan = equipment.plan_assignment(&first, Utc::now()).unwrap();
    state.equipment.commit_assignment(&plan).await.unwrap();

    let equipment = state.equipment.find_by_id(equipment.id).await.unwrap().unwrap();
    let plan = equipment.plan_assignment(&second, Utc::now()).unwrap();
    state.equipment.commit_assignment(&plan).await.unwrap();

    // a plan built from a stale read loses the compare-and-swap
    let stale = equipment.plan_assignment(&second, Utc::now()).unwrap();
    assert!(matches!(
        state.equipment.commit_assignment(&stale).await,
        Err(AppError::InvalidState(_))
    ));

    let stored = state.equipment.find_by_id(equipment.id).await.unwrap().unwrap();
    assert_eq!(stored.current_motor_id, Some(second.id));
    assert_eq!(stored.motor_history.len(), 2);
    assert_eq!(stored.open_installations().count(), 1);

    let first = state.motors.find_by_id(first.id).await.unwrap().unwrap();
    let second = state.motors.find_by_id(second.id).await.unwrap().unwrap();
    assert_eq!(first.status, MotorStatus::Spare);
    assert_eq!(second.status, MotorStatus::Active);

    assert!(matches!(
        state.motors.delete(second.id).await,
        Err(AppError::InvalidState(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_serial_is_conflict() {
    let state = setup_state().await;
    let motor = spare_motor(&state).await;
    let copy = Motor::new(motor.serial_number.clone(), MotorSpecs::default(), MotorStatus::Spare);

    assert!(matches!(
        state.motors.insert(&copy).await,
        Err(AppError::DuplicateKey(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_assigning_deleted_motor_is_not_found() {
    let state = setup_state().await;
    let motor = spare_motor(&state).await;
    let equipment = Equipment::new(tag("TON"), "Fan".into(), "Plant B".into());
    state.equipment.insert(&equipment).await.unwrap();

    let plan = equipment.plan_assignment(&motor, Utc::now()).unwrap();
    state.motors.delete(motor.id).await.unwrap();

    assert!(matches!(
        state.equipment.commit_assignment(&plan).await,
        Err(AppError::NotFound(_))
    ));
    let stored = state.equipment.find_by_id(equipment.id).await.unwrap().unwrap();
    assert_eq!(stored.current_motor_id, None);
    assert!(stored.motor_history.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_attribute_update_keeps_assignment_and_service_date() {
    let state = setup_state().await;
    let motor = spare_motor(&state).await;
    let equipment = Equipment::new(tag("TON"), "Mixer".into(), "Plant C".into());
    state.equipment.insert(&equipment).await.unwrap();

    let mut stale = state.motors.find_by_id(motor.id).await.unwrap().unwrap();
    let plan = equipment.plan_assignment(&motor, Utc::now()).unwrap();
    state.equipment.commit_assignment(&plan).await.unwrap();
    let serviced = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    state
        .motors
        .add_event(motor.id, &MaintenanceEvent::new(serviced, "Greasing".into()))
        .await
        .unwrap();

    stale.specs.note = Some("Noisy bearing".into());
    stale.updated_at = Utc::now();
    state.motors.update(&stale, None).await.unwrap();

    let stored = state.motors.find_by_id(motor.id).await.unwrap().unwrap();
    assert_eq!(stored.status, MotorStatus::Active);
    assert_eq!(stored.last_maintenance_date, Some(serviced));
    assert_eq!(stored.specs.note.as_deref(), Some("Noisy bearing"));
}
