use hunt_portal::{
    AppState, DashboardShell, MockUserStore, UserStoreState, ViewRegistry,
    config::{AppConfig, Env},
    create_router,
    hash::MemoryAddressBar,
    notify::ToastBoard,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, registry validation, shell assembly and the
/// HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: invalid configuration");

    // 2. Logging filter, RUST_LOG first.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hunt_portal=debug,tower_http=info,axum=trace".into());

    // 3. Log format per environment.
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

    tracing::info!("Dashboard shell starting in {:?} mode", config.env);

    // 4. View registry, validated before anything routes against it.
    let registry = Arc::new(ViewRegistry::dashboard().expect("FATAL: invalid view registry"));

    // 5. Shell assembly and the initial inbound pass (empty fragment -> landing).
    let mut shell = DashboardShell::new(
        registry,
        Arc::new(MemoryAddressBar::new()),
        ToastBoard::with_ttl_ms(config.toast_ttl_ms),
    );
    if let Err(error) = shell.boot() {
        tracing::warn!(%error, "Initial route did not resolve cleanly");
    }

    let app_state = AppState {
        shell: shell.into_shared(),
        users: Arc::new(MockUserStore::new()) as UserStoreState,
    };

    // 6. Router and server.
    let app = create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("FATAL: failed to bind listener");

    tracing::info!("Listening on {}", config.bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: server terminated unexpectedly");
}
