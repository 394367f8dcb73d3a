use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AuthUser, Session};

/// Claims
///
/// Represents the standard payload structure expected inside the provider's
/// JSON Web Token (JWT). The anon client holds no signing secret, so claims
/// are decoded without signature verification and used purely for session
/// freshness and identity recovery, never for authorization proofs (those are
/// enforced server-side by the provider's row-level security).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The UUID of the user. This is the primary key used to
    /// fetch the user's profile and role from the public.profiles table.
    pub sub: Uuid,
    /// The user's email as recorded by the auth provider at token issue time.
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration Time (exp): Timestamp after which the session must not be
    /// treated as live. Checked on every current-user lookup.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the JWT was issued.
    #[serde(default)]
    pub iat: usize,
}

/// AuthError
///
/// Failure taxonomy for the session lifecycle operations. These are returned
/// as values; nothing in the auth layer panics across the component boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no active session")]
    NotSignedIn,
    #[error("session expired")]
    SessionExpired,
    #[error("access token is malformed or not a JWT")]
    InvalidToken,
    /// The provider accepted the request transport but rejected it
    /// (bad credentials, duplicate email, weak password, ...).
    #[error("auth provider rejected the request: {0}")]
    Provider(String),
    /// The request never completed (DNS, TLS, connection failures).
    #[error("auth request failed: {0}")]
    Transport(String),
}

/// AuthEvent
///
/// Session state transition kinds delivered to `on_auth_change` subscribers.
/// Delivery is at-least-once per transition; no ordering guarantee is made
/// between concurrent transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
}

/// Callback signature for auth state change subscriptions. The session is the
/// state *after* the transition (`None` after sign-out).
pub type AuthChangeCallback = Box<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;

/// SessionProvider
///
/// Defines the abstract contract for the external auth collaborator. The core
/// components (Role Resolver, Content Submission Gate) depend only on this
/// trait, so the concrete Supabase client can be swapped for the in-memory
/// mock during testing without affecting any gating logic.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Registers a new principal with the provider. On success the returned
    /// session becomes the ambient session for subsequent operations.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Exchanges credentials for a session (password grant).
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Destroys the ambient session. Signing out without a session is a no-op.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Returns the identity behind the ambient session, or `None` when there
    /// is no session or the session has expired. This is the single lookup the
    /// Role Resolver and the gate build on.
    async fn current_user(&self) -> Option<AuthUser>;

    /// Registers a notification fired on every session state transition.
    fn on_auth_change(&self, callback: AuthChangeCallback);
}

/// SessionState
///
/// The concrete type used to share session access across the component graph.
pub type SessionState = Arc<dyn SessionProvider>;

/// decode_claims
///
/// Decodes the claims of a provider-issued access token. Signature validation
/// is disabled (the signing secret never leaves the provider); expiry
/// validation stays active so stale tokens surface as `SessionExpired`.
pub fn decode_claims(token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    // Provider tokens carry aud = "authenticated"; it is not checked here.
    validation.validate_aud = false;
    validation.validate_exp = true;

    match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(AuthError::SessionExpired),
            _ => Err(AuthError::InvalidToken),
        },
    }
}

// --- The Mock Implementation (For Unit Tests) ---

/// MockSessionProvider
///
/// In-memory implementation of `SessionProvider` used for unit and integration
/// testing. Sessions are fabricated locally; no network involved. The mock
/// fires auth-change notifications exactly like the real client so the
/// subscription contract is testable.
pub struct MockSessionProvider {
    session: RwLock<Option<Session>>,
    listeners: Mutex<Vec<AuthChangeCallback>>,
    /// When true, sign-up and sign-in return a simulated provider rejection.
    pub should_fail: bool,
}

impl MockSessionProvider {
    /// A signed-out provider.
    pub fn new() -> Self {
        Self {
            session: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }

    /// A signed-out provider whose credential operations always fail.
    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    /// A provider with an already-established session for the given user.
    pub fn signed_in(user: AuthUser) -> Self {
        let provider = Self::new();
        *provider.session.write().expect("session lock poisoned") = Some(Session {
            access_token: "mock-access-token".to_string(),
            refresh_token: None,
            user,
        });
        provider
    }

    fn establish(&self, email: &str) -> Session {
        let session = Session {
            access_token: "mock-access-token".to_string(),
            refresh_token: None,
            user: AuthUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
            },
        };
        *self.session.write().expect("session lock poisoned") = Some(session.clone());
        session
    }

    fn notify(&self, event: AuthEvent, session: Option<&Session>) {
        for listener in self.listeners.lock().expect("listener lock poisoned").iter() {
            listener(event, session);
        }
    }
}

impl Default for MockSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    async fn sign_up(&self, email: &str, _password: &str) -> Result<Session, AuthError> {
        if self.should_fail {
            return Err(AuthError::Provider(
                "Mock auth error: simulation requested".to_string(),
            ));
        }
        let session = self.establish(email);
        self.notify(AuthEvent::SignedIn, Some(&session));
        Ok(session)
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<Session, AuthError> {
        if self.should_fail {
            return Err(AuthError::Provider(
                "Mock auth error: simulation requested".to_string(),
            ));
        }
        let session = self.establish(email);
        self.notify(AuthEvent::SignedIn, Some(&session));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let had_session = self
            .session
            .write()
            .expect("session lock poisoned")
            .take()
            .is_some();
        if had_session {
            self.notify(AuthEvent::SignedOut, None);
        }
        Ok(())
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.user.clone())
    }

    fn on_auth_change(&self, callback: AuthChangeCallback) {
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .push(callback);
    }
}
