//! The `{ success, data | error }` envelope every action answers with.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{ser::SerializeStruct, Serialize, Serializer};

use crate::flows::FlowError;

/// Coarse failure class attached to a failed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Provider,
    Validation,
    Internal,
}

impl From<&FlowError> for FailureKind {
    fn from(err: &FlowError) -> Self {
        match err {
            FlowError::Network(_) => FailureKind::Network,
            FlowError::Provider { .. } => FailureKind::Provider,
            FlowError::Validation(_) => FailureKind::Validation,
            FlowError::Internal(_) => FailureKind::Internal,
        }
    }
}

/// User-facing side of a failure. `error` is always a generic message;
/// the underlying detail only goes to the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    pub error: String,
    pub kind: FailureKind,
}

impl ActionFailure {
    pub fn new(kind: FailureKind, message: &str) -> Self {
        Self {
            error: message.to_string(),
            kind,
        }
    }

    fn serialize_into<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ActionResult", 3)?;
        state.serialize_field("success", &false)?;
        state.serialize_field("error", &self.error)?;
        state.serialize_field("kind", &self.kind)?;
        state.end()
    }
}

/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": "...", "kind": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    Success(T),
    Failure(ActionFailure),
}

#[cfg(test)]
impl<T> ActionResult<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            ActionResult::Success(data) => Some(data),
            ActionResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ActionFailure> {
        match self {
            ActionResult::Success(_) => None,
            ActionResult::Failure(failure) => Some(failure),
        }
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ActionResult::Success(data) => {
                let mut state = serializer.serialize_struct("ActionResult", 2)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                state.end()
            }
            ActionResult::Failure(failure) => failure.serialize_into(serializer),
        }
    }
}

impl<T: Serialize> IntoResponse for ActionResult<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Result of the save stub. Unlike the flow actions, success carries an
/// `attemptId` at the top level instead of a `data` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { attempt_id: String },
    Failure(ActionFailure),
}

impl Serialize for SaveOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SaveOutcome::Saved { attempt_id } => {
                let mut state = serializer.serialize_struct("SaveOutcome", 2)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("attemptId", attempt_id)?;
                state.end()
            }
            SaveOutcome::Failure(failure) => failure.serialize_into(serializer),
        }
    }
}

impl IntoResponse for SaveOutcome {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
