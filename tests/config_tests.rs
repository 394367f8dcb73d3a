use content_portal::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic};

// --- Setup/Teardown Utilities ---

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T, cleanup_vars: Vec<&'static str>) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(String, Option<String>)> = cleanup_vars
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    // Run the test
    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    // Re-panic if the test failed
    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_fail_fast_on_missing_url() {
    let result = run_with_env(
        || {
            unsafe {
                env::remove_var("SUPABASE_URL");
                env::set_var("SUPABASE_ANON_KEY", "anon-key");
            }
            panic::catch_unwind(AppConfig::load)
        },
        vec!["SUPABASE_URL", "SUPABASE_ANON_KEY"],
    );

    assert!(
        result.is_err(),
        "Config loading should panic when SUPABASE_URL is missing"
    );
}

#[test]
#[serial]
fn test_app_config_fail_fast_on_missing_anon_key() {
    let result = run_with_env(
        || {
            unsafe {
                env::set_var("SUPABASE_URL", "https://project.supabase.co");
                env::remove_var("SUPABASE_ANON_KEY");
            }
            panic::catch_unwind(AppConfig::load)
        },
        vec!["SUPABASE_URL", "SUPABASE_ANON_KEY"],
    );

    assert!(
        result.is_err(),
        "Config loading should panic when SUPABASE_ANON_KEY is missing"
    );
}

#[test]
#[serial]
fn test_app_config_loads_production_environment() {
    let config = run_with_env(
        || {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::set_var("SUPABASE_URL", "https://project.supabase.co");
                env::set_var("SUPABASE_ANON_KEY", "anon-key");
            }
            AppConfig::load()
        },
        vec!["APP_ENV", "SUPABASE_URL", "SUPABASE_ANON_KEY"],
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.supabase_url, "https://project.supabase.co");
    assert_eq!(config.supabase_anon_key, "anon-key");
}

#[test]
#[serial]
fn test_app_config_defaults_to_local_environment() {
    let config = run_with_env(
        || {
            unsafe {
                env::remove_var("APP_ENV");
                env::set_var("SUPABASE_URL", "http://localhost:54321");
                env::set_var("SUPABASE_ANON_KEY", "anon-key");
            }
            AppConfig::load()
        },
        vec!["APP_ENV", "SUPABASE_URL", "SUPABASE_ANON_KEY"],
    );

    assert_eq!(config.env, Env::Local);
}

#[test]
fn test_default_config_is_local_scaffolding() {
    let config = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert_eq!(config.supabase_url, "http://localhost:54321");
}
