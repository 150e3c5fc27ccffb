use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

use super::bearer::bearer_from_headers;
use crate::error::AppError;
use crate::AppState;

/// The verified identity behind the current request.
///
/// Taking `Viewer` as a handler argument makes the route require a valid
/// `Authorization: Bearer` credential. It lives only as long as the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer(pub Uuid);

impl Viewer {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for Viewer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state,
            None => {
                return ready(Err(AppError::InternalError(
                    "Application state not configured".to_string(),
                )))
            }
        };

        let result = bearer_from_headers(req.headers())
            .and_then(|token| state.auth_service.validate_token(token))
            .map(Viewer)
            .map_err(|kind| {
                warn!(path = %req.path(), reason = %kind, "rejected credential");
                AppError::AuthError(kind)
            });

        ready(result)
    }
}
