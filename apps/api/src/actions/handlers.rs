//! Axum route handlers for the Server Actions.
//!
//! Every route answers `200 OK` with an envelope, including malformed request
//! bodies, so clients only ever branch on `success`.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::warn;

use crate::actions::{
    generate_quiz_action, get_course_recommendations_action,
    get_recommendations_from_quiz_action, save_career_quiz_result_action, ActionFailure,
    ActionResult, FailureKind, SaveOutcome, SaveQuizResultInput, COURSES_FAILED,
    RECOMMENDATIONS_FAILED, SAVE_FAILED,
};
use crate::flows::types::{
    CareerRecommendationOutput, CourseRecommendationInput, CourseRecommendationOutput, Quiz,
    RecommendationInput,
};
use crate::state::AppState;

fn malformed(route: &str, rejection: &JsonRejection, message: &str) -> ActionFailure {
    warn!(route, error = %rejection.body_text(), "malformed action request body");
    ActionFailure::new(FailureKind::Validation, message)
}

/// POST /api/v1/actions/generate-quiz
pub async fn handle_generate_quiz(State(state): State<AppState>) -> ActionResult<Quiz> {
    generate_quiz_action(state.flows.as_ref()).await
}

/// POST /api/v1/actions/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    body: Result<Json<RecommendationInput>, JsonRejection>,
) -> ActionResult<CareerRecommendationOutput> {
    match body {
        Ok(Json(input)) => get_recommendations_from_quiz_action(state.flows.as_ref(), input).await,
        Err(rejection) => ActionResult::Failure(malformed(
            "recommendations",
            &rejection,
            RECOMMENDATIONS_FAILED,
        )),
    }
}

/// POST /api/v1/actions/course-recommendations
pub async fn handle_course_recommendations(
    State(state): State<AppState>,
    body: Result<Json<CourseRecommendationInput>, JsonRejection>,
) -> ActionResult<CourseRecommendationOutput> {
    match body {
        Ok(Json(input)) => get_course_recommendations_action(state.flows.as_ref(), input).await,
        Err(rejection) => ActionResult::Failure(malformed(
            "course-recommendations",
            &rejection,
            COURSES_FAILED,
        )),
    }
}

/// POST /api/v1/actions/save-quiz-result
///
/// Mock persistence. Logs the payload and hands back a fabricated attempt id.
pub async fn handle_save_quiz_result(
    body: Result<Json<SaveQuizResultInput>, JsonRejection>,
) -> SaveOutcome {
    match body {
        Ok(Json(input)) => save_career_quiz_result_action(input).await,
        Err(rejection) => {
            SaveOutcome::Failure(malformed("save-quiz-result", &rejection, SAVE_FAILED))
        }
    }
}
