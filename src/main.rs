use axum::{routing::get, Router};
use std::{env, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classfunnel_runtime::backend::BackendClient;
use classfunnel_runtime::clock::{self, ServerClock};
use classfunnel_runtime::mailer::Mailer;
use classfunnel_runtime::roster::{InMemoryRoster, StudentRepo};
use classfunnel_runtime::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "classfunnel_runtime=info,axum=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let backend = BackendClient::from_env();
    let ttl = env::var("SERVER_TIME_TTL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(clock::DEFAULT_TTL);
    // SERVER_TIME_OVERRIDE pins the clock for deterministic test runs.
    let clock = match env::var("SERVER_TIME_OVERRIDE")
        .ok()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok())
    {
        Some(pinned) => {
            ServerClock::with_override(backend.clone(), pinned.with_timezone(&chrono::Utc))
        }
        None => ServerClock::new(backend.clone(), ttl),
    };
    let roster: Arc<dyn StudentRepo> = if env::var("DEMO_ROSTER").is_ok() {
        Arc::new(InMemoryRoster::with_demo_data())
    } else {
        Arc::new(InMemoryRoster::new())
    };
    let state = Arc::new(AppState {
        clock,
        backend,
        roster,
        mailer: Mailer::from_env(),
    });

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(routes::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let port: u16 = env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(8081);
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
