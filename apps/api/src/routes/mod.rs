pub mod health;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::actions::handlers as actions;
use crate::dashboard;
use crate::roles::handlers as roles;
use crate::state::AppState;

/// All routes, without the role provider installed.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_handler))
        // Server actions
        .route(
            "/api/v1/actions/generate-quiz",
            post(actions::handle_generate_quiz),
        )
        .route(
            "/api/v1/actions/recommendations",
            post(actions::handle_recommendations),
        )
        .route(
            "/api/v1/actions/course-recommendations",
            post(actions::handle_course_recommendations),
        )
        .route(
            "/api/v1/actions/save-quiz-result",
            post(actions::handle_save_quiz_result),
        )
        // Session role
        .route(
            "/api/v1/session",
            post(roles::handle_open_session).delete(roles::handle_close_session),
        )
        .route(
            "/api/v1/session/role",
            get(roles::handle_get_role).put(roles::handle_set_role),
        )
        // Dashboards
        .route("/api/v1/dashboard", get(dashboard::handle_dashboard))
        .route(
            "/api/v1/dashboard/:area",
            get(dashboard::handle_dashboard_area),
        )
}

pub fn build_router(state: AppState) -> Router {
    api_routes()
        .layer(Extension(state.roles.clone()))
        .with_state(state)
}
