use content_portal::{
    AppConfig, SupabaseClient,
    auth::{AuthError, AuthEvent, Claims, MockSessionProvider, SessionProvider, decode_claims},
    models::AuthUser,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// --- Test Utilities ---

const USER_ID: Uuid = Uuid::from_u128(7);

// Mints a provider-style access token. The signing secret is irrelevant:
// claims are decoded without signature verification on the anon side.
fn token_with_exp(exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: USER_ID,
        email: Some("someone@example.com".to_string()),
        exp: (now + exp_offset_secs).max(0) as usize,
        iat: now as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("token encoding should succeed")
}

// --- Claims Decoding ---

#[test]
fn test_decode_claims_recovers_identity() {
    let token = token_with_exp(3600);
    let claims = decode_claims(&token).expect("fresh token should decode");
    assert_eq!(claims.sub, USER_ID);
    assert_eq!(claims.email.as_deref(), Some("someone@example.com"));
}

#[test]
fn test_decode_claims_rejects_expired_token() {
    // Well past the default leeway.
    let token = token_with_exp(-3600);
    let result = decode_claims(&token);
    assert!(matches!(result, Err(AuthError::SessionExpired)));
}

#[test]
fn test_decode_claims_rejects_garbage() {
    let result = decode_claims("definitely-not-a-jwt");
    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

// --- Session Lifecycle (Mock Provider) ---

#[tokio::test]
async fn test_sign_in_establishes_session() {
    let provider = MockSessionProvider::new();
    assert!(provider.current_user().await.is_none());

    let session = provider
        .sign_in("someone@example.com", "hunter2")
        .await
        .expect("mock sign-in should succeed");
    assert_eq!(session.user.email, "someone@example.com");

    let user = provider.current_user().await.expect("session should be live");
    assert_eq!(user.id, session.user.id);
}

#[tokio::test]
async fn test_sign_out_destroys_session() {
    let provider = MockSessionProvider::signed_in(AuthUser {
        id: USER_ID,
        email: "someone@example.com".to_string(),
    });

    provider.sign_out().await.expect("sign-out should succeed");
    assert!(provider.current_user().await.is_none());

    // Signing out again without a session is a no-op, not an error.
    provider.sign_out().await.expect("repeated sign-out is a no-op");
}

#[tokio::test]
async fn test_failing_provider_rejects_credentials() {
    let provider = MockSessionProvider::new_failing();

    let result = provider.sign_in("someone@example.com", "hunter2").await;
    assert!(matches!(result, Err(AuthError::Provider(_))));
    assert!(provider.current_user().await.is_none());
}

#[tokio::test]
async fn test_auth_change_events_fire_per_transition() {
    let provider = MockSessionProvider::new();
    let events: Arc<Mutex<Vec<AuthEvent>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = events.clone();
    provider.on_auth_change(Box::new(move |event, session| {
        // The delivered session reflects the state after the transition.
        match event {
            AuthEvent::SignedIn => assert!(session.is_some()),
            AuthEvent::SignedOut => assert!(session.is_none()),
        }
        sink.lock().unwrap().push(event);
    }));

    provider
        .sign_up("someone@example.com", "hunter2")
        .await
        .expect("mock sign-up should succeed");
    provider.sign_out().await.expect("sign-out should succeed");
    // No transition, no event.
    provider.sign_out().await.expect("no-op sign-out");

    assert_eq!(
        *events.lock().unwrap(),
        vec![AuthEvent::SignedIn, AuthEvent::SignedOut]
    );
}

// --- Session Restoration (Supabase Client, no network) ---

#[tokio::test]
async fn test_set_session_restores_identity_from_token() {
    let client = SupabaseClient::new(&AppConfig::default());
    assert!(client.current_user().await.is_none());

    let session = client
        .set_session(&token_with_exp(3600))
        .expect("fresh token should restore a session");
    assert_eq!(session.user.id, USER_ID);

    let user = client.current_user().await.expect("restored session is live");
    assert_eq!(user.email, "someone@example.com");
}

#[tokio::test]
async fn test_set_session_rejects_expired_token() {
    let client = SupabaseClient::new(&AppConfig::default());

    let result = client.set_session(&token_with_exp(-3600));
    assert!(matches!(result, Err(AuthError::SessionExpired)));
    // The rejected token must not leave a half-restored session behind.
    assert!(client.current_user().await.is_none());
}
