use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use academy_admin::api::router;
use academy_admin::config::{AppConfig, StoreBackend};
use academy_admin::services::{RefreshScheduler, refresh_all};
use academy_admin::state::AppState;
use academy_admin::store::{FirebaseConfig, FirebaseHttpClient, MemoryStore, RemoteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "academy_admin=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let remote: Arc<dyn RemoteStore> = match config.store_backend {
        StoreBackend::Firebase => {
            let firebase = FirebaseConfig::new_from_env()?;
            info!("using Firebase project {}", firebase.project_id);
            Arc::new(FirebaseHttpClient::new(firebase)?)
        }
        StoreBackend::Memory => {
            info!("using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(remote);

    match refresh_all(&state).await {
        Ok(stats) => info!(
            "initial load: {} courses, {} teachers",
            stats.courses, stats.teachers
        ),
        Err(e) => error!("initial load failed, serving empty lists: {}", e),
    }

    if let Some(secs) = config.refresh_interval_secs {
        let scheduler = RefreshScheduler::new(state.clone(), Duration::from_secs(secs));
        tokio::spawn(scheduler.start());
    }

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
