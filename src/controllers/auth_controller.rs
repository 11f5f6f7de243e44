use std::sync::Arc;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::models::user::{Role, User};
use crate::repositories::UserRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};
use crate::utils::validation::non_blank;

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

pub struct AuthController {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            jwt: state.jwt_config(),
        }
    }

    /// Exchange email and password for a bearer token
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let (Some(email), Some(password)) = (
            non_blank(request.email.as_deref()),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::ValidationError(
                "Please provide an email and password".to_string(),
            ));
        };

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(invalid_credentials)?;

        let matches = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        if !matches {
            tracing::warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid_credentials());
        }

        let token = generate_token(user.id, user.role, &self.jwt)?;

        tracing::info!(user_id = %user.id, role = %user.role, "✅ User logged in");
        Ok(LoginResponse::new(token, user))
    }
}

/// Seed the configured administrator when the user table is empty.
/// Returns whether an account was created.
pub async fn ensure_bootstrap_admin(state: &AppState) -> AppResult<bool> {
    let Some(admin) = state.config.bootstrap_admin.as_ref() else {
        return Ok(false);
    };

    if state.users.count().await? > 0 {
        return Ok(false);
    }

    let password_hash = bcrypt::hash(&admin.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Hash(e.to_string()))?;
    let user = User::new(
        admin.username.clone(),
        admin.email.clone(),
        password_hash,
        Role::Admin,
    );
    state.users.insert(&user).await?;

    tracing::info!(email = %user.email, "👤 Bootstrap administrator created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::{BootstrapAdmin, EnvironmentConfig};
    use crate::utils::jwt::verify_token;

    async fn state_with_user(role: Role) -> AppState {
        let state = AppState::in_memory(EnvironmentConfig::default());
        let hash = bcrypt::hash("secret123", 4).unwrap();
        state
            .users
            .insert(&User::new("jdoe".into(), "jdoe@example.com".into(), hash, role))
            .await
            .unwrap();
        state
    }

    fn request(email: Option<&str>, password: Option<&str>) -> LoginRequest {
        LoginRequest {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_login_issues_token_with_role() {
        let state = state_with_user(Role::Manager).await;
        let response = AuthController::new(&state)
            .login(request(Some("jdoe@example.com"), Some("secret123")))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.data.username, "jdoe");

        let claims = verify_token(&response.token, &state.jwt_config()).unwrap();
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.sub, response.data.id.to_string());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let state = state_with_user(Role::User).await;
        let controller = AuthController::new(&state);

        for (email, password) in [
            ("jdoe@example.com", "wrong"),
            ("nobody@example.com", "secret123"),
        ] {
            assert!(matches!(
                controller.login(request(Some(email), Some(password))).await,
                Err(AppError::Unauthorized(ref msg)) if msg == "Invalid credentials"
            ));
        }
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let state = state_with_user(Role::User).await;
        assert!(matches!(
            AuthController::new(&state)
                .login(request(Some("jdoe@example.com"), None))
                .await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_only_seeds_empty_store() {
        let config = EnvironmentConfig {
            bootstrap_admin: Some(BootstrapAdmin {
                username: "admin".into(),
                email: "admin@example.com".into(),
                password: "changeme".into(),
            }),
            ..EnvironmentConfig::default()
        };
        let state = AppState::in_memory(config);

        assert!(ensure_bootstrap_admin(&state).await.unwrap());
        assert!(!ensure_bootstrap_admin(&state).await.unwrap());

        let admin = state
            .users
            .find_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(bcrypt::verify("changeme", &admin.password_hash).unwrap());
    }
}
