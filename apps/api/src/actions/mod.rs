//! Server Actions: one flow call each, normalized into an `ActionResult`.
//!
//! Each action calls its flow exactly once and passes the input through
//! untouched. Actions never return `Err` and never unwind. Whatever goes wrong
//! inside a flow (error or panic) is logged here with full detail and turned
//! into a failed envelope carrying a generic message.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use chrono::Utc;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::flows::types::{
    CareerRecommendationOutput, CourseRecommendationInput, CourseRecommendationOutput, Quiz,
    QuizAnswers, RecommendationInput,
};
use crate::flows::{CareerFlows, FlowError};

pub mod envelope;
pub mod handlers;

pub use envelope::{ActionFailure, ActionResult, FailureKind, SaveOutcome};

pub const QUIZ_FAILED: &str = "Failed to generate the career quiz. Please try again.";
pub const RECOMMENDATIONS_FAILED: &str =
    "Failed to get career recommendations. Please try again.";
pub const COURSES_FAILED: &str = "Failed to get course recommendations. Please try again.";
pub const SAVE_FAILED: &str = "Failed to save your quiz results. Please try again.";

/// Payload for the save stub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuizResultInput {
    pub quiz: Quiz,
    pub answers: QuizAnswers,
    pub recommendations: CareerRecommendationOutput,
    pub user_id: String,
}

pub async fn generate_quiz_action(flows: &dyn CareerFlows) -> ActionResult<Quiz> {
    run_flow(
        "generate_quiz",
        QUIZ_FAILED,
        flows.generate_career_interest_quiz(),
    )
    .await
}

pub async fn get_recommendations_from_quiz_action(
    flows: &dyn CareerFlows,
    input: RecommendationInput,
) -> ActionResult<CareerRecommendationOutput> {
    run_flow(
        "get_recommendations_from_quiz",
        RECOMMENDATIONS_FAILED,
        flows.get_recommendations_from_quiz_results(&input),
    )
    .await
}

pub async fn get_course_recommendations_action(
    flows: &dyn CareerFlows,
    input: CourseRecommendationInput,
) -> ActionResult<CourseRecommendationOutput> {
    run_flow(
        "get_course_recommendations",
        COURSES_FAILED,
        flows.get_course_recommendations_for_internships(&input),
    )
    .await
}

/// Stand-in for persistence: logs the full payload and fabricates an attempt id
/// from the current time. Nothing is written anywhere.
pub async fn save_career_quiz_result_action(input: SaveQuizResultInput) -> SaveOutcome {
    let payload = match serde_json::to_string(&input) {
        Ok(payload) => payload,
        Err(e) => {
            error!(action = "save_career_quiz_result", error = %e, "action failed");
            return SaveOutcome::Failure(ActionFailure::new(FailureKind::Internal, SAVE_FAILED));
        }
    };

    let attempt_id = format!("attempt-{}", Utc::now().timestamp_millis());
    info!(
        user_id = %input.user_id,
        attempt_id = %attempt_id,
        payload = %payload,
        "Saving career quiz result (no persistence configured)"
    );

    SaveOutcome::Saved { attempt_id }
}

/// Awaits a flow call, absorbing errors and panics into a failed envelope.
async fn run_flow<T, F>(action: &'static str, message: &str, call: F) -> ActionResult<T>
where
    F: Future<Output = Result<T, FlowError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(data)) => ActionResult::Success(data),
        Ok(Err(err)) => {
            error!(action, error = %err, "action failed");
            ActionResult::Failure(ActionFailure::new(FailureKind::from(&err), message))
        }
        Err(panic) => {
            error!(action, panic = %panic_message(panic.as_ref()), "flow panicked");
            ActionResult::Failure(ActionFailure::new(FailureKind::Internal, message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::flows::testing::{
        sample_answers, sample_courses, sample_quiz, sample_recommendations, Script, StubFlows,
    };
    use crate::flows::types::{Answer, Internship};

    fn recommendation_input() -> RecommendationInput {
        RecommendationInput {
            quiz: sample_quiz(),
            answers: sample_answers(),
        }
    }

    fn course_input() -> CourseRecommendationInput {
        CourseRecommendationInput {
            internships: vec![Internship {
                title: "Data Intern".to_string(),
                company: None,
                description: None,
                required_skills: vec!["SQL".to_string()],
            }],
            student_skills: vec![],
        }
    }

    #[tokio::test]
    async fn test_quiz_success_passes_data_through() {
        let flows = StubFlows::default();
        let result = generate_quiz_action(&flows).await;
        assert_eq!(result, ActionResult::Success(sample_quiz()));
        assert_eq!(flows.calls(), 1);
    }

    #[tokio::test]
    async fn test_quiz_provider_error_becomes_generic_failure() {
        let flows = StubFlows {
            quiz: Script::Fail(|| FlowError::Provider {
                status: 500,
                message: "internal model detail".to_string(),
            }),
            ..StubFlows::default()
        };
        let result = generate_quiz_action(&flows).await;
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Provider);
        assert_eq!(failure.error, QUIZ_FAILED);
        assert!(!failure.error.contains("internal model detail"));
    }

    #[tokio::test]
    async fn test_flow_panic_is_absorbed() {
        let flows = StubFlows {
            recommendations: Script::Panic,
            ..StubFlows::default()
        };
        let result = get_recommendations_from_quiz_action(&flows, recommendation_input()).await;
        assert_eq!(
            result,
            ActionResult::Failure(ActionFailure::new(
                FailureKind::Internal,
                RECOMMENDATIONS_FAILED
            ))
        );
    }

    #[tokio::test]
    async fn test_recommendations_success_is_unchanged() {
        let flows = StubFlows::default();
        let result = get_recommendations_from_quiz_action(&flows, recommendation_input()).await;
        assert_eq!(result.data(), Some(&sample_recommendations()));
    }

    #[tokio::test]
    async fn test_recommendations_network_error() {
        let flows = StubFlows {
            recommendations: Script::Fail(|| FlowError::Network("connection reset".into())),
            ..StubFlows::default()
        };
        let result = get_recommendations_from_quiz_action(&flows, recommendation_input()).await;
        assert_eq!(result.failure().map(|f| f.kind), Some(FailureKind::Network));
        assert_eq!(flows.calls(), 1);
    }

    #[tokio::test]
    async fn test_extra_answer_keys_reach_the_flow() {
        let flows = StubFlows::default();
        let mut input = recommendation_input();
        input
            .answers
            .insert("bonus".to_string(), Answer::Single("x".to_string()));
        let result = get_recommendations_from_quiz_action(&flows, input.clone()).await;
        assert_eq!(result, ActionResult::Success(sample_recommendations()));
        assert_eq!(flows.calls(), 1);
        assert_eq!(flows.last_recommendation_input(), Some(input));
    }

    #[tokio::test]
    async fn test_empty_answers_still_call_flow_once() {
        let flows = StubFlows::default();
        let input = RecommendationInput {
            quiz: sample_quiz(),
            answers: QuizAnswers::new(),
        };
        let result = get_recommendations_from_quiz_action(&flows, input).await;
        assert!(result.data().is_some());
        assert_eq!(flows.calls(), 1);
    }

    #[tokio::test]
    async fn test_courses_success() {
        let flows = StubFlows::default();
        let ok = get_course_recommendations_action(&flows, course_input()).await;
        assert_eq!(ok, ActionResult::Success(sample_courses()));
        assert_eq!(flows.calls(), 1);
    }

    #[tokio::test]
    async fn test_courses_validation_error_from_flow() {
        let flows = StubFlows {
            courses: Script::Fail(|| FlowError::Validation("malformed model output".into())),
            ..StubFlows::default()
        };
        let result = get_course_recommendations_action(&flows, course_input()).await;
        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Validation);
        assert_eq!(failure.error, COURSES_FAILED);
        assert_eq!(flows.calls(), 1);
    }

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[derive(Clone)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_save_returns_attempt_id_and_logs_user() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = CaptureWriter(Arc::clone(&buffer));
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let input = SaveQuizResultInput {
            quiz: sample_quiz(),
            answers: sample_answers(),
            recommendations: sample_recommendations(),
            user_id: "u1".to_string(),
        };

        let before = Utc::now().timestamp_millis();
        let outcome = tracing::subscriber::with_default(subscriber, || {
            futures::executor::block_on(save_career_quiz_result_action(input))
        });
        let after = Utc::now().timestamp_millis();

        let attempt_id = match outcome {
            SaveOutcome::Saved { attempt_id } => attempt_id,
            SaveOutcome::Failure(f) => panic!("save failed: {f:?}"),
        };
        let millis: i64 = attempt_id
            .strip_prefix("attempt-")
            .expect("attempt- prefix")
            .parse()
            .expect("numeric timestamp");
        assert!(millis >= before && millis <= after);

        let logs = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("u1"));
        assert!(logs.contains(r#""userId":"u1""#));
        assert!(logs.contains(&attempt_id));
    }
}
