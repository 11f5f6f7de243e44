#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use motor_tracker::{
    config::EnvironmentConfig,
    models::user::{Role, User},
    state::AppState,
    utils::jwt::generate_token,
};
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "secret123";

/// Router over a fresh in-memory store with one user per role
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub admin: String,
    pub manager: String,
    pub user: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let state = AppState::in_memory(EnvironmentConfig::default());

        let admin = seed_user(&state, "admin", Role::Admin).await;
        let manager = seed_user(&state, "manager", Role::Manager).await;
        let user = seed_user(&state, "viewer", Role::User).await;

        Self {
            router: motor_tracker::create_router(state.clone()),
            state,
            admin,
            manager,
            user,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            bytes,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Register a motor as admin and return its id
    pub async fn create_motor(&self, serial: &str) -> String {
        let response = self
            .post(
                "/api/motors",
                &self.admin,
                serde_json::json!({ "serial_number": serial, "manufacturer": "ABB", "power": "10 HP" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "create motor {}", serial);
        id_of(&response.json())
    }

    /// Register equipment as admin and return its id
    pub async fn create_equipment(&self, ton_number: &str) -> String {
        let response = self
            .post(
                "/api/equipment",
                &self.admin,
                serde_json::json!({
                    "ton_number": ton_number,
                    "designation": "Cooling pump",
                    "plant": "Plant A"
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "create equipment {}", ton_number);
        id_of(&response.json())
    }

    pub async fn assign(&self, equipment_id: &str, motor_id: &str) -> TestResponse {
        self.post(
            &format!("/api/equipment/{}/assign-motor", equipment_id),
            &self.manager,
            serde_json::json!({ "motor_id": motor_id }),
        )
        .await
    }

    pub async fn motor(&self, id: &str) -> Value {
        self.get(&format!("/api/motors/{}", id), &self.user).await.json()["data"].clone()
    }

    pub async fn equipment(&self, id: &str) -> Value {
        self.get(&format!("/api/equipment/{}", id), &self.user).await.json()["data"].clone()
    }
}

pub fn id_of(body: &Value) -> String {
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn seed_user(state: &AppState, username: &str, role: Role) -> String {
    let hash = bcrypt::hash(PASSWORD, 4).unwrap();
    let user = User::new(
        username.to_string(),
        format!("{}@plant.test", username),
        hash,
        role,
    );
    state.users.insert(&user).await.unwrap();
    generate_token(user.id, role, &state.jwt_config()).unwrap()
}
