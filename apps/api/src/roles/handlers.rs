use axum::{extract::rejection::JsonRejection, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::roles::{session_id_from, Role, RoleProvider, SessionRole};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRoleResponse {
    pub session_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// POST /api/v1/session
pub async fn handle_open_session(
    provider: RoleProvider,
) -> (StatusCode, Json<SessionRoleResponse>) {
    let (session_id, context) = provider.open_session().await;
    (
        StatusCode::CREATED,
        Json(SessionRoleResponse {
            session_id,
            role: context.role(),
        }),
    )
}

/// DELETE /api/v1/session
pub async fn handle_close_session(
    provider: RoleProvider,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let session_id = session_id_from(&headers)?;
    if provider.close_session(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {session_id} not found")))
    }
}

/// GET /api/v1/session/role
pub async fn handle_get_role(session: SessionRole) -> Json<SessionRoleResponse> {
    Json(SessionRoleResponse {
        session_id: session.session_id,
        role: session.context.role(),
    })
}

/// PUT /api/v1/session/role
pub async fn handle_set_role(
    session: SessionRole,
    body: Result<Json<SetRoleRequest>, JsonRejection>,
) -> Result<Json<SessionRoleResponse>, AppError> {
    let Json(req) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    session.context.set_role(req.role);
    info!(session_id = %session.session_id, role = ?req.role, "session role updated");
    Ok(Json(SessionRoleResponse {
        session_id: session.session_id,
        role: session.context.role(),
    }))
}
