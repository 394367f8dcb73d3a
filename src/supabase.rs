use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::auth::{
    AuthChangeCallback, AuthError, AuthEvent, SessionProvider, decode_claims,
};
use crate::config::AppConfig;
use crate::models::{AuthUser, ContentItem, ContentKind, Profile, Session};
use crate::repository::{ContentStore, ProfileStore, StoreError};

/// SupabaseClient
///
/// The concrete implementation of all three collaborator contracts
/// (`SessionProvider`, `ProfileStore`, `ContentStore`) against a Supabase
/// project: the GoTrue HTTP API for sessions and PostgREST for records.
///
/// The client holds the one piece of mutable state in the whole component
/// graph: the ambient session handle. Everything else is request-scoped.
/// Wire-level behavior (row-level security, insertion timestamping, token
/// issuance) is the provider's own and is deliberately not re-implemented here.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    listeners: Mutex<Vec<AuthChangeCallback>>,
}

// --- Provider Response Schemas ---

/// Successful GoTrue token grant (password sign-in, auto-confirmed sign-up).
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    user: SupabaseUser,
}

#[derive(Deserialize)]
struct SupabaseUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl SupabaseClient {
    /// Constructs the client from the loaded configuration. The anon key is
    /// sent as the `apikey` header on every request; authenticated requests
    /// additionally carry the session's access token as the bearer.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            session: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// set_session
    ///
    /// Restores the ambient session from a persisted access token (e.g. one a
    /// frontend kept across page loads). The token's claims supply the user
    /// identity; an expired or malformed token is rejected and leaves the
    /// current session untouched.
    pub fn set_session(&self, access_token: &str) -> Result<Session, AuthError> {
        let claims = decode_claims(access_token)?;
        let session = Session {
            access_token: access_token.to_string(),
            refresh_token: None,
            user: AuthUser {
                id: claims.sub,
                email: claims.email.unwrap_or_default(),
            },
        };
        *self.session.write().expect("session lock poisoned") = Some(session.clone());
        self.notify(AuthEvent::SignedIn, Some(&session));
        Ok(session)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    /// The bearer for record operations: the live session's access token when
    /// one exists (so row-level security sees the caller), the anon key
    /// otherwise (anonymous reads).
    fn bearer_token(&self) -> String {
        let guard = self.session.read().expect("session lock poisoned");
        match guard.as_ref() {
            Some(session) if decode_claims(&session.access_token).is_ok() => {
                session.access_token.clone()
            }
            _ => self.anon_key.clone(),
        }
    }

    fn store_session(&self, session: &Session) {
        *self.session.write().expect("session lock poisoned") = Some(session.clone());
    }

    fn notify(&self, event: AuthEvent, session: Option<&Session>) {
        for listener in self.listeners.lock().expect("listener lock poisoned").iter() {
            listener(event, session);
        }
    }

    /// Exchanges a successful GoTrue body for a stored session. Sign-up with
    /// email confirmation enabled returns a bare user record without tokens;
    /// that is surfaced as a provider rejection since no session was issued.
    fn adopt_token_response(&self, body: Value) -> Result<Session, AuthError> {
        if body.get("access_token").is_none() {
            return Err(AuthError::Provider(
                "signup accepted but no session was issued (email confirmation pending)"
                    .to_string(),
            ));
        }
        let token: TokenResponse =
            serde_json::from_value(body).map_err(|e| AuthError::Provider(e.to_string()))?;
        let session = Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: AuthUser {
                id: token.user.id,
                email: token.user.email.unwrap_or_default(),
            },
        };
        self.store_session(&session);
        self.notify(AuthEvent::SignedIn, Some(&session));
        Ok(session)
    }
}

/// provider_message
///
/// Extracts a human-readable reason from a GoTrue/PostgREST error body. The
/// two services disagree on the field name, so all known spellings are tried
/// before falling back to the raw body.
fn provider_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string());
    format!("{}: {}", status, detail)
}

#[async_trait]
impl SessionProvider for SupabaseClient {
    /// sign_up
    ///
    /// POST /auth/v1/signup. On success (auto-confirm projects) the returned
    /// session becomes ambient. The password is passed through to the
    /// provider and never persisted or logged by this crate.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(provider_message(status, &body)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        self.adopt_token_response(body)
    }

    /// sign_in
    ///
    /// POST /auth/v1/token?grant_type=password. Bad credentials come back as
    /// `AuthError::Provider` with the provider-reported reason.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response = self
            .http
            .post(format!(
                "{}?grant_type=password",
                self.auth_url("token")
            ))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(provider_message(status, &body)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        self.adopt_token_response(body)
    }

    /// sign_out
    ///
    /// Clears the ambient session, then asks the provider to revoke the token
    /// (POST /auth/v1/logout). The local sign-out always wins: a failed remote
    /// revocation is logged, not surfaced, since the caller's session is gone
    /// either way and tokens expire on their own.
    async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.session.write().expect("session lock poisoned").take();
        let Some(session) = session else {
            return Ok(());
        };

        let result = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(status = %response.status(), "remote sign-out failed, local session cleared");
            }
            Err(e) => {
                tracing::warn!("remote sign-out failed, local session cleared: {e}");
            }
            Ok(_) => {}
        }

        self.notify(AuthEvent::SignedOut, None);
        Ok(())
    }

    /// current_user
    ///
    /// Read-only lookup of the ambient session's identity. A session whose
    /// access token has expired is treated as absent; the next sign-in
    /// replaces it.
    async fn current_user(&self) -> Option<AuthUser> {
        let guard = self.session.read().expect("session lock poisoned");
        let session = guard.as_ref()?;
        match decode_claims(&session.access_token) {
            Ok(_) => Some(session.user.clone()),
            Err(AuthError::SessionExpired) => {
                tracing::debug!(user_id = %session.user.id, "session expired, treating as signed out");
                None
            }
            Err(_) => None,
        }
    }

    fn on_auth_change(&self, callback: AuthChangeCallback) {
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .push(callback);
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    /// get_profile
    ///
    /// GET /rest/v1/profiles?id=eq.{id}. Any failure (transport, non-2xx,
    /// unparseable body) folds to `None` and is logged; the Role Resolver
    /// turns that into a guest resolution.
    async fn get_profile(&self, id: Uuid) -> Option<Profile> {
        let url = format!(
            "{}?select=*&id=eq.{}&limit=1",
            self.rest_url("profiles"),
            id
        );

        let response = match self
            .http
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer_token())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("get_profile error: {:?}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "get_profile rejected");
            return None;
        }

        match response.json::<Vec<Profile>>().await {
            Ok(rows) => rows.into_iter().next(),
            Err(e) => {
                tracing::error!("get_profile decode error: {:?}", e);
                None
            }
        }
    }
}

#[async_trait]
impl ContentStore for SupabaseClient {
    /// insert
    ///
    /// POST /rest/v1/{collection} with `Prefer: return=representation` so the
    /// store echoes back the inserted row(s) including its assigned `id` and
    /// `created_at`. Exactly one attempt; rejections (including row-level
    /// security denials) surface as `StoreError::Provider`.
    async fn insert(
        &self,
        kind: ContentKind,
        record: Value,
    ) -> Result<Vec<ContentItem>, StoreError> {
        let response = self
            .http
            .post(self.rest_url(kind.collection()))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer_token())
            .header("Prefer", "return=representation")
            .json(&serde_json::json!([record]))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Provider(provider_message(status, &body)));
        }

        response
            .json::<Vec<ContentItem>>()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))
    }

    /// list_recent
    ///
    /// GET /rest/v1/{collection}?order=created_at.desc — a single
    /// full-collection fetch, most recent first. The store is the sole
    /// arbiter of that order via its own timestamping.
    async fn list_recent(&self, kind: ContentKind) -> Result<Vec<ContentItem>, StoreError> {
        let url = format!(
            "{}?select=*&order=created_at.desc",
            self.rest_url(kind.collection())
        );

        let response = self
            .http
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer_token())
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Provider(provider_message(status, &body)));
        }

        response
            .json::<Vec<ContentItem>>()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))
    }
}
