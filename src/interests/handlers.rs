use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::sanitize_interests;
use crate::auth::Viewer;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct InterestsBody {
    pub interests: Vec<String>,
}

pub async fn get_interests(
    viewer: Viewer,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let interests = state.users.get_interests(viewer.id()).await?;
    Ok(HttpResponse::Ok().json(InterestsBody { interests }))
}

/// Replaces the viewer's interest set. Only the owner can reach this, since
/// the target is always the authenticated viewer.
pub async fn replace_interests(
    viewer: Viewer,
    body: web::Json<InterestsBody>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let interests = sanitize_interests(&body.interests)?;
    state.users.replace_interests(viewer.id(), &interests).await?;

    info!(user_id = %viewer.id(), count = interests.len(), "interests updated");
    Ok(HttpResponse::Ok().json(InterestsBody { interests }))
}
