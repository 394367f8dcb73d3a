use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded,
/// and owned by the process entry point: the Supabase client is constructed
/// from it explicitly rather than reading the environment ad hoc.
#[derive(Clone)]
pub struct AppConfig {
    // The Supabase project URL (serves both the auth and REST endpoints).
    pub supabase_url: String,
    // The project's public (anon) API key. Row-level security is what keeps
    // this key safe to embed client-side; it is not a secret.
    pub supabase_anon_key: String,
    // Runtime environment marker. Controls log formatting.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, used to switch between human-readable local
/// logging and structured JSON output for production log aggregation.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup, pointing at the standard local Supabase stack.
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "local-anon-key".to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration
    /// at startup. Implements the **fail-fast** principle: both backend
    /// identifiers are required in every environment, since nothing in this
    /// crate works without the provider endpoint.
    ///
    /// # Panics
    /// Panics if `SUPABASE_URL` or `SUPABASE_ANON_KEY` is not set.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        Self {
            supabase_url: env::var("SUPABASE_URL").expect("FATAL: SUPABASE_URL must be set."),
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .expect("FATAL: SUPABASE_ANON_KEY must be set."),
            env,
        }
    }
}
