use content_portal::{
    AppState, SessionProvider,
    config::{AppConfig, Env},
    models::{ContentKind, PostDraft},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point, responsible for initializing configuration
/// and logging, wiring the Supabase client into the component graph, and
/// dispatching one of the small maintenance commands that exercise the
/// listing, role-resolution and submission paths.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    // AppConfig::load() implements the fail-fast principle for missing backend identifiers.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Prioritizes the RUST_LOG environment variable, falling back to sensible
    // defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "content_portal=debug".into());

    // 3. Initialize Logging based on Environment
    // Pretty output for humans locally, JSON for log aggregators in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Starting in {:?} mode against {}", config.env, config.supabase_url);

    // 4. Component Graph Assembly
    // One shared Supabase client behind all three capability handles; the gate
    // and resolver receive them by injection.
    let state = AppState::from_supabase(config);
    let gate = state.gate();

    // 5. Command Dispatch
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["posts"] => list(&gate, ContentKind::Post).await,
        ["blogs"] => list(&gate, ContentKind::Blog).await,
        ["whoami", email, password] => {
            if let Err(e) = state.sessions.sign_in(email, password).await {
                tracing::error!("sign-in failed: {e}");
                std::process::exit(1);
            }
            let role = gate.roles().resolve().await;
            println!("{email}: {role}");
        }
        ["add-post", email, password, title, body] => {
            if let Err(e) = state.sessions.sign_in(email, password).await {
                tracing::error!("sign-in failed: {e}");
                std::process::exit(1);
            }
            let draft = PostDraft {
                title: title.to_string(),
                body: body.to_string(),
                company: None,
            };
            match gate.add_post(&draft).await {
                Ok(items) => {
                    for item in items {
                        println!("created {} at {}", item.id, item.created_at);
                    }
                }
                Err(e) => {
                    tracing::error!("submission failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("usage: content-portal <posts | blogs>");
            eprintln!("       content-portal whoami <email> <password>");
            eprintln!("       content-portal add-post <email> <password> <title> <body>");
            std::process::exit(2);
        }
    }
}

/// Prints one collection, most recent first, in a terse line format.
async fn list(gate: &content_portal::ContentGate, kind: ContentKind) {
    match gate.list(kind).await {
        Ok(items) => {
            for item in items {
                let title = item
                    .fields
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or("(untitled)");
                println!("{}  {}  {}", item.created_at, item.author_email, title);
            }
        }
        Err(e) => {
            tracing::error!("listing failed: {e}");
            std::process::exit(1);
        }
    }
}
