use std::sync::Arc;

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod gate;
pub mod models;
pub mod repository;
pub mod roles;
pub mod supabase;

// --- Public Re-exports ---

// Makes core types easily accessible to the application entry point (main.rs)
// and to downstream callers.
pub use auth::{AuthError, SessionProvider, SessionState};
pub use config::AppConfig;
pub use gate::{ContentGate, GateError};
pub use models::{ContentItem, ContentKind, Role};
pub use repository::{ContentState, ContentStore, ProfileState, ProfileStore, StoreError};
pub use roles::RoleResolver;
pub use supabase::SupabaseClient;

/// AppState
///
/// The single, thread-safe, immutable container holding the collaborator
/// capability handles and configuration. The three handles usually point at
/// one shared Supabase client, but they are kept as separate trait objects so
/// any collaborator can be swapped (notably for the in-memory mocks in tests)
/// without touching the others.
#[derive(Clone)]
pub struct AppState {
    /// Session layer: sign-in/out and current-user lookup.
    pub sessions: SessionState,
    /// Profile layer: per-user role records.
    pub profiles: ProfileState,
    /// Content layer: the posts and blogs collections.
    pub content: ContentState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires all three capability handles to one shared Supabase client built
    /// from the given configuration. This is the production composition; the
    /// client's lifecycle is owned by whoever holds the returned state.
    pub fn from_supabase(config: AppConfig) -> Self {
        let client = Arc::new(SupabaseClient::new(&config));
        Self {
            sessions: client.clone() as SessionState,
            profiles: client.clone() as ProfileState,
            content: client as ContentState,
            config,
        }
    }

    /// A Content Submission Gate over this state's collaborators.
    pub fn gate(&self) -> ContentGate {
        ContentGate::new(
            self.sessions.clone(),
            self.profiles.clone(),
            self.content.clone(),
        )
    }

    /// A Role Resolver over this state's collaborators.
    pub fn roles(&self) -> RoleResolver {
        RoleResolver::new(self.sessions.clone(), self.profiles.clone())
    }
}
