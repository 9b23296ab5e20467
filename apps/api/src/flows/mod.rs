//! AI Flows: the generative operations behind the server actions.
//!
//! `AppState` carries an `Arc<dyn CareerFlows>`. Production wires in
//! `LlmCareerFlows`; tests swap in a stub without touching handlers or actions.

use async_trait::async_trait;
use thiserror::Error;

use crate::llm_client::{LlmClient, LlmError};

pub mod prompts;
pub mod types;

use prompts::{
    CAREER_FLOW_SYSTEM, COURSE_PROMPT_TEMPLATE, QUIZ_PROMPT, RECOMMENDATION_PROMPT_TEMPLATE,
};
use types::{
    CareerRecommendationOutput, CourseRecommendationInput, CourseRecommendationOutput, Quiz,
    RecommendationInput,
};

/// Why a flow call failed. Drives the `kind` tag on failed action envelopes.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with an error status.
    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    /// Input or output did not have the expected shape.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<LlmError> for FlowError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) if e.is_decode() => FlowError::Validation(e.to_string()),
            LlmError::Http(e) => FlowError::Network(e.to_string()),
            LlmError::Api { status, message } => FlowError::Provider { status, message },
            LlmError::Parse(e) => FlowError::Validation(format!("malformed model output: {e}")),
            LlmError::EmptyContent => {
                FlowError::Validation("model returned no content".to_string())
            }
        }
    }
}

/// The three AI operations the actions depend on.
#[async_trait]
pub trait CareerFlows: Send + Sync {
    async fn generate_career_interest_quiz(&self) -> Result<Quiz, FlowError>;

    async fn get_recommendations_from_quiz_results(
        &self,
        input: &RecommendationInput,
    ) -> Result<CareerRecommendationOutput, FlowError>;

    async fn get_course_recommendations_for_internships(
        &self,
        input: &CourseRecommendationInput,
    ) -> Result<CourseRecommendationOutput, FlowError>;
}

/// Flows backed by the LLM client. Each operation is one `call_json` round trip.
pub struct LlmCareerFlows {
    llm: LlmClient,
}

impl LlmCareerFlows {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CareerFlows for LlmCareerFlows {
    async fn generate_career_interest_quiz(&self) -> Result<Quiz, FlowError> {
        let quiz: Quiz = self.llm.call_json(QUIZ_PROMPT, CAREER_FLOW_SYSTEM).await?;
        if quiz.questions.is_empty() {
            return Err(FlowError::Validation(
                "model returned a quiz with no questions".to_string(),
            ));
        }
        Ok(quiz)
    }

    async fn get_recommendations_from_quiz_results(
        &self,
        input: &RecommendationInput,
    ) -> Result<CareerRecommendationOutput, FlowError> {
        if input.quiz.questions.is_empty() {
            return Err(FlowError::Validation("quiz has no questions".to_string()));
        }
        if input.answers.is_empty() {
            return Err(FlowError::Validation("no answers supplied".to_string()));
        }
        let prompt = build_recommendation_prompt(input)?;
        Ok(self.llm.call_json(&prompt, CAREER_FLOW_SYSTEM).await?)
    }

    async fn get_course_recommendations_for_internships(
        &self,
        input: &CourseRecommendationInput,
    ) -> Result<CourseRecommendationOutput, FlowError> {
        if input.internships.is_empty() {
            return Err(FlowError::Validation("no internships supplied".to_string()));
        }
        let prompt = build_course_prompt(input)?;
        Ok(self.llm.call_json(&prompt, CAREER_FLOW_SYSTEM).await?)
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, FlowError> {
    serde_json::to_string_pretty(value).map_err(|e| FlowError::Internal(e.to_string()))
}

fn build_recommendation_prompt(input: &RecommendationInput) -> Result<String, FlowError> {
    Ok(RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{quiz_json}", &to_pretty_json(&input.quiz)?)
        .replace("{answers_json}", &to_pretty_json(&input.answers)?))
}

fn build_course_prompt(input: &CourseRecommendationInput) -> Result<String, FlowError> {
    Ok(COURSE_PROMPT_TEMPLATE
        .replace("{internships_json}", &to_pretty_json(&input.internships)?)
        .replace("{skills_json}", &to_pretty_json(&input.student_skills)?))
}
