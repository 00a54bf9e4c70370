use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vendor_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    identity::{IdentityState, JwtIdentityProvider, SupabaseIdentityProvider},
    repository::{PostgresRepository, RepositoryState},
};

/// main
///
/// Loads configuration and logging, constructs the collaborators (database pool and
/// identity provider) once, and serves the gateway-fronted router.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vendor_portal=debug,tower_http=info,axum=trace".into());

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

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Profile/product store
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");
    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 4. Identity provider: the Supabase auth API in production, local JWT
    //    verification (with the x-user-id bypass) during development.
    let identity = match config.env {
        Env::Production => Arc::new(
            SupabaseIdentityProvider::new(
                &config.supabase_url,
                &config.supabase_anon_key,
                config.identity_timeout,
            )
            .expect("FATAL: Failed to build the identity provider HTTP client."),
        ) as IdentityState,
        Env::Local => Arc::new(JwtIdentityProvider::new(&config.jwt_secret, true)) as IdentityState,
    };

    // 5. Router and server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        repo,
        identity,
        config,
    });

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
