//! Role Context: one mutable role flag per session.
//!
//! A `RoleProvider` is installed on the router as an extension and owns every
//! session's `RoleContext`. Handlers reach the current session's role through
//! the `SessionRole` extractor; without a provider on the router the extractor
//! fails with a configuration error on every request.
//!
//! Sessions idle longer than the provider's TTL are dropped, and the map is
//! capped; when full, the least recently seen session is evicted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

pub mod handlers;

pub const SESSION_HEADER: &str = "x-session-id";
pub const OUTSIDE_PROVIDER: &str = "role context must be used within a RoleProvider";
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Host,
    Admin,
}

/// A single session's role plus its subscribers.
///
/// `set_role` publishes synchronously: every receiver from `subscribe` sees the
/// new value as soon as the call returns.
#[derive(Clone)]
pub struct RoleContext {
    tx: Arc<watch::Sender<Role>>,
}

impl RoleContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Role::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn role(&self) -> Role {
        *self.tx.borrow()
    }

    pub fn set_role(&self, next: Role) {
        let previous = self.tx.send_replace(next);
        debug!(?previous, ?next, "role changed");
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<Role> {
        self.tx.subscribe()
    }
}

impl Default for RoleContext {
    fn default() -> Self {
        Self::new()
    }
}

struct SessionEntry {
    context: RoleContext,
    last_seen: Instant,
}

/// Owns the role context of every live session. Cheap to clone.
#[derive(Clone)]
pub struct RoleProvider {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for RoleProvider {
    fn default() -> Self {
        Self::with_limits(DEFAULT_SESSION_IDLE, DEFAULT_MAX_SESSIONS)
    }
}

impl RoleProvider {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// `max_sessions` below 1 is treated as 1.
    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Starts a new session with the default role, evicting idle sessions first.
    pub async fn open_session(&self) -> (Uuid, RoleContext) {
        let id = Uuid::new_v4();
        let context = RoleContext::new();
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_ttl);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                }
                None => break,
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "evicted sessions");
        }

        sessions.insert(
            id,
            SessionEntry {
                context: context.clone(),
                last_seen: now,
            },
        );
        debug!(session_id = %id, "session opened");
        (id, context)
    }

    /// Looks up a live session and marks it as seen. Expired sessions are dropped.
    pub async fn context(&self, session_id: Uuid) -> Option<RoleContext> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&session_id)?;
        if now.duration_since(entry.last_seen) >= self.idle_ttl {
            sessions.remove(&session_id);
            debug!(session_id = %session_id, "session expired");
            return None;
        }
        entry.last_seen = now;
        Some(entry.context.clone())
    }

    /// Drops a session. Returns false if it did not exist.
    pub async fn close_session(&self, session_id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&session_id).is_some();
        if removed {
            debug!(session_id = %session_id, "session closed");
        }
        removed
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RoleProvider {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RoleProvider>()
            .cloned()
            .ok_or_else(|| AppError::Configuration(OUTSIDE_PROVIDER.to_string()))
    }
}

/// The role context selected by the request's `x-session-id` header.
pub struct SessionRole {
    pub session_id: Uuid,
    pub context: RoleContext,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionRole {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let provider = RoleProvider::from_request_parts(parts, state).await?;
        let session_id = session_id_from(&parts.headers)?;
        let context = provider
            .context(session_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;
        Ok(Self {
            session_id,
            context,
        })
    }
}

pub fn session_id_from(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let raw = headers
        .get(SESSION_HEADER)
        .ok_or_else(|| AppError::Validation(format!("missing {SESSION_HEADER} header")))?;
    raw.to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or_else(|| AppError::Validation(format!("{SESSION_HEADER} must be a UUID")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    #[test]
    fn test_default_role_is_student() {
        assert_eq!(RoleContext::new().role(), Role::Student);
    }

    #[test]
    fn test_set_role_is_visible_to_all_subscribers_immediately() {
        let context = RoleContext::new();
        let first = context.subscribe();
        let second = context.clone().subscribe();

        context.set_role(Role::Host);

        assert_eq!(context.role(), Role::Host);
        assert_eq!(*first.borrow(), Role::Host);
        assert_eq!(*second.borrow(), Role::Host);
        assert!(first.has_changed().unwrap());
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        let role: Role = serde_json::from_str(r#""host""#).unwrap();
        assert_eq!(role, Role::Host);
        assert!(serde_json::from_str::<Role>(r#""superuser""#).is_err());
    }

    #[tokio::test]
    async fn test_provider_sessions_are_isolated() {
        let provider = RoleProvider::new();
        let (a, ctx_a) = provider.open_session().await;
        let (b, _) = provider.open_session().await;

        ctx_a.set_role(Role::Admin);

        assert_eq!(provider.context(a).await.unwrap().role(), Role::Admin);
        assert_eq!(provider.context(b).await.unwrap().role(), Role::Student);
    }

    #[tokio::test]
    async fn test_close_session() {
        let provider = RoleProvider::new();
        let (id, _) = provider.open_session().await;
        assert!(provider.close_session(id).await);
        assert!(!provider.close_session(id).await);
        assert!(provider.context(id).await.is_none());
    }

    #[tokio::test]
    async fn test_extractor_without_provider_is_configuration_error() {
        // Same outcome whether or not a session header is present.
        for header in [None, Some(Uuid::new_v4().to_string())] {
            let mut builder = Request::builder();
            if let Some(value) = &header {
                builder = builder.header(SESSION_HEADER, value);
            }
            let (mut parts, _) = builder.body(()).unwrap().into_parts();

            let err = SessionRole::from_request_parts(&mut parts, &())
                .await
                .err()
                .unwrap();
            match err {
                AppError::Configuration(msg) => assert_eq!(msg, OUTSIDE_PROVIDER),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_extractor_resolves_session() {
        let provider = RoleProvider::new();
        let (id, context) = provider.open_session().await;
        context.set_role(Role::Host);

        let (mut parts, _) = Request::builder()
            .header(SESSION_HEADER, id.to_string())
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(provider);

        let session = SessionRole::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(session.session_id, id);
        assert_eq!(session.context.role(), Role::Host);
    }

    #[test]
    fn test_session_id_from_rejects_garbage() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            session_id_from(&headers),
            Err(AppError::Validation(_))
        ));
        headers.insert(SESSION_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(
            session_id_from(&headers),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted_on_open() {
        let provider = RoleProvider::with_limits(Duration::from_secs(60), 100);
        let (stale, _) = provider.open_session().await;

        tokio::time::advance(Duration::from_secs(30)).await;
        let (fresh, _) = provider.open_session().await;

        tokio::time::advance(Duration::from_secs(31)).await;
        provider.open_session().await;

        assert_eq!(provider.len().await, 2);
        assert!(provider.context(stale).await.is_none());
        assert!(provider.context(fresh).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_refreshes_and_expires_sessions() {
        let provider = RoleProvider::with_limits(Duration::from_secs(60), 100);
        let (id, _) = provider.open_session().await;

        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(provider.context(id).await.is_some());

        // last seen 50s in, so still alive at 100s
        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(provider.context(id).await.is_some());

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(provider.context(id).await.is_none());
        assert_eq!(provider.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_cap_evicts_least_recently_seen() {
        let provider = RoleProvider::with_limits(Duration::from_secs(3600), 2);
        let (first, _) = provider.open_session().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        let (second, _) = provider.open_session().await;
        tokio::time::advance(Duration::from_secs(1)).await;

        // touching the first session makes the second the oldest
        assert!(provider.context(first).await.is_some());
        tokio::time::advance(Duration::from_secs(1)).await;
        let (third, _) = provider.open_session().await;

        assert_eq!(provider.len().await, 2);
        assert!(provider.context(second).await.is_none());
        assert!(provider.context(first).await.is_some());
        assert!(provider.context(third).await.is_some());
    }
}
