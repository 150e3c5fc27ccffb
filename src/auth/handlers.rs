use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::extractor::Viewer;
use crate::db::UserProfile;
use crate::error::{AppError, DatabaseError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

impl AuthResponse {
    fn new(state: &AppState, token: String, user_id: Option<Uuid>) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in: state.auth_service.tokens().ttl_seconds(),
            user_id,
        }
    }
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    // Addresses stay out of the logs; the service logs the user id once known.
    match state.auth_service.authenticate(&req.email, &req.password).await {
        Ok(token) => Ok(HttpResponse::Ok().json(AuthResponse::new(&state, token, None))),
        Err(e) => {
            warn!("Login failed: {}", e);
            Err(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    match state
        .auth_service
        .register(&req.email, &req.password, req.display_name.as_deref())
        .await
    {
        Ok((user, token)) => {
            info!(user_id = %user.id, "Registration successful");
            Ok(HttpResponse::Created().json(AuthResponse::new(&state, token, Some(user.id))))
        }
        Err(e) => {
            warn!("Registration failed: {}", e);
            Err(e)
        }
    }
}

pub async fn me(
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .users
        .get_user_by_id(viewer.id())
        .await?
        .ok_or(AppError::DatabaseError(DatabaseError::NotFound))?;

    Ok(HttpResponse::Ok().json(UserProfile::from(user)))
}
