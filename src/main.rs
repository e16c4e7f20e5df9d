//! Main entry point for the Prompt Gallery server

use prompt_gallery::{
    api,
    backend::{GenerationBackend, HttpBackend},
    config::Settings,
    gallery::GalleryService,
    pipeline::{ImagePipeline, PipelineConfig},
    repository::{InMemoryPostRepository, PostRepository},
    storage::{FileMediaStore, MediaStore},
    AppState,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {}", e);
        }
    }

    // Load and validate configuration before anything else
    let settings = Settings::load()?;
    settings.validate()?;

    init_logging(&settings);

    info!("Starting Prompt Gallery");
    info!(
        "Loaded configuration: server={}:{}",
        settings.server.host, settings.server.port
    );

    let backend: Arc<dyn GenerationBackend> = Arc::new(HttpBackend::new(&settings.generation)?);

    let media_store = FileMediaStore::from_config(&settings.media);
    media_store.ensure_storage_dir().await?;
    let media_store: Arc<dyn MediaStore> = Arc::new(media_store);

    let pipeline = Arc::new(ImagePipeline::with_config(
        backend,
        media_store,
        PipelineConfig::from(&settings),
    ));

    let repository: Arc<dyn PostRepository> = match &settings.repository.journal_path {
        Some(path) => Arc::new(InMemoryPostRepository::open(path).await?),
        None => {
            warn!("No repository.journal_path configured; posts will not survive a restart");
            Arc::new(InMemoryPostRepository::new())
        }
    };

    let app_state = Arc::new(AppState {
        settings: Arc::new(settings.clone()),
        gallery: Arc::new(GalleryService::new(pipeline, repository)),
    });

    let app = api::routes::create_router(app_state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if settings.logging.format == "pretty" {
        registry.with(fmt::layer().pretty()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}
