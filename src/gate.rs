use serde_json::Value;
use thiserror::Error;

use crate::auth::SessionState;
use crate::models::{AuthUser, BlogDraft, ContentItem, ContentKind, PostDraft, Role};
use crate::repository::{ContentState, ProfileState, StoreError};
use crate::roles::RoleResolver;

/// GateError
///
/// The complete failure taxonomy of a submission or listing call. All four
/// kinds are returned as values; the gate never lets a fault cross its
/// boundary unwrapped. The UI layer decides what to surface or retry.
#[derive(Debug, Error)]
pub enum GateError {
    /// No live session. Submission requires an authenticated caller.
    #[error("must be signed in to submit content")]
    Unauthenticated,
    /// The caller is authenticated but the resolved role does not permit the
    /// requested collection (blogs are admin-only).
    #[error("only administrators can create blog posts")]
    Forbidden,
    /// The remote insert/select failed. Single attempt, surfaced as-is.
    #[error("content store failure: {0}")]
    StoreFailure(#[from] StoreError),
    /// Anything unexpected caught at the boundary (malformed payload,
    /// serialization failure).
    #[error("unexpected submission failure: {0}")]
    Unknown(String),
}

/// ContentGate
///
/// The role-gated content-submission workflow. Per call the gate walks:
/// check session → check role (blogs only) → stamp ownership → insert,
/// terminating in exactly one of success, `Unauthenticated`, `Forbidden`,
/// `StoreFailure` or `Unknown`.
///
/// Ownership stamping is the one invariant the gate owns outright: the
/// persisted `user_id` and `author_email` always come from the session,
/// overwriting any same-named fields in the caller's payload.
pub struct ContentGate {
    sessions: SessionState,
    roles: RoleResolver,
    content: ContentState,
}

impl ContentGate {
    pub fn new(sessions: SessionState, profiles: ProfileState, content: ContentState) -> Self {
        let roles = RoleResolver::new(sessions.clone(), profiles);
        Self {
            sessions,
            roles,
            content,
        }
    }

    /// submit
    ///
    /// Submits one record to the collection matching `kind`. The payload must
    /// be a JSON object; its fields are passed through to the store with the
    /// ownership columns stamped over whatever the caller supplied.
    pub async fn submit(
        &self,
        kind: ContentKind,
        payload: Value,
    ) -> Result<Vec<ContentItem>, GateError> {
        // 1. A valid session must exist.
        let user = self
            .sessions
            .current_user()
            .await
            .ok_or(GateError::Unauthenticated)?;

        // 2. Blogs are admin-only. Posts need no extra check: any
        //    authenticated caller passes.
        if kind == ContentKind::Blog && self.roles.resolve().await != Role::Admin {
            tracing::warn!(user_id = %user.id, "blog submission denied, caller is not admin");
            return Err(GateError::Forbidden);
        }

        // 3. Stamp ownership and forward. Insertion order and timestamping
        //    belong to the store.
        let record = stamp_ownership(payload, &user)?;
        let inserted = self.content.insert(kind, record).await?;

        tracing::info!(kind = %kind, user_id = %user.id, "content submitted");
        Ok(inserted)
    }

    /// Typed convenience path over `submit` for interview posts.
    pub async fn add_post(&self, draft: &PostDraft) -> Result<Vec<ContentItem>, GateError> {
        let payload = serde_json::to_value(draft).map_err(|e| GateError::Unknown(e.to_string()))?;
        self.submit(ContentKind::Post, payload).await
    }

    /// Typed convenience path over `submit` for blog entries (admin-only).
    pub async fn add_blog(&self, draft: &BlogDraft) -> Result<Vec<ContentItem>, GateError> {
        let payload = serde_json::to_value(draft).map_err(|e| GateError::Unknown(e.to_string()))?;
        self.submit(ContentKind::Blog, payload).await
    }

    /// list
    ///
    /// Full-collection fetch ordered most-recent-first. Open to any caller;
    /// visibility restrictions, if any, are the store's row-level concern.
    pub async fn list(&self, kind: ContentKind) -> Result<Vec<ContentItem>, GateError> {
        self.content
            .list_recent(kind)
            .await
            .map_err(GateError::from)
    }

    /// The resolver this gate consults, exposed for role lookups (`whoami`).
    pub fn roles(&self) -> &RoleResolver {
        &self.roles
    }
}

/// stamp_ownership
///
/// Merges the payload with the session-derived ownership columns. The two
/// stamped fields always win over caller-supplied values; ownership cannot be
/// spoofed through the payload.
fn stamp_ownership(payload: Value, user: &AuthUser) -> Result<Value, GateError> {
    let mut record = match payload {
        Value::Object(map) => map,
        other => {
            return Err(GateError::Unknown(format!(
                "payload must be a JSON object, got {}",
                json_type_name(&other)
            )));
        }
    };

    record.insert("user_id".to_string(), Value::String(user.id.to_string()));
    record.insert(
        "author_email".to_string(),
        Value::String(user.email.clone()),
    );
    Ok(Value::Object(record))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
