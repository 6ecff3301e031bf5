use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use noshow_api::{ServiceConfig, app};
use noshow_infra::{ArtifactSync, MirrorSync, NoSync};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    noshow_observability::init();

    let config = ServiceConfig::from_env();

    let sync: Box<dyn ArtifactSync> = match &config.model_mirror {
        Some(dir) => Box::new(MirrorSync::new(dir)),
        None => Box::new(NoSync),
    };
    if let Err(e) = sync.sync(&config.bundle_path) {
        warn!(path = %config.bundle_path.display(), "artifact sync failed: {e}");
    }

    let services = Arc::new(app::build_services(&config));
    if !services.store.is_ready() {
        warn!("starting without a loaded bundle; predictions will answer 503 until a reload succeeds");
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app::build_app(services))
        .await
        .context("server terminated")?;
    Ok(())
}
