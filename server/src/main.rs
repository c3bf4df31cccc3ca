//! Job Board Server
//!
//! Serves the paginated job feed, job detail and bookmarks over a REST API
//! using Axum.

mod app;
mod config;
mod telemetry;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use jobs_bookmarks::{BookmarkStore, CollectionStore, LocalBlobStore, Reconciler};
use jobs_feed::{DetailResolver, FeedSource, HttpFeedSource, Paginator};
use tokio::net::TcpListener;

use app::AppState;
use config::{AppConfig, BookmarkBackend, CONFIG_PATH};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    println!("🚀 Starting Job Board Server...\n");

    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        println!("⚠️  No {} found, using defaults", CONFIG_PATH);
    }
    let config = AppConfig::load(config_path)?;

    // One HTTP client for the whole process, shared by the list and detail views.
    let source: Arc<dyn FeedSource> = Arc::new(HttpFeedSource::new(&config.feed.base_url));
    println!("📡 Job feed: {}", config.feed.base_url);

    println!("📂 Bookmarks {}", config.bookmarks.describe());
    let store: Arc<dyn BookmarkStore> = match &config.bookmarks {
        BookmarkBackend::Local { path } => Arc::new(LocalBlobStore::open(path.clone()).await),
        BookmarkBackend::Remote => Arc::new(CollectionStore::new()),
    };
    let reconciler = Reconciler::new(store);

    let state = Arc::new(AppState::new(
        Paginator::new(source.clone(), config.feed.page_ceiling),
        DetailResolver::new(source),
        reconciler.clone(),
    ));

    // Keep the bookmark list in step with every change the store reports.
    let mut subscription = reconciler.subscribe();
    let mirror = state.clone();
    mirror.bookmarks.lock().await.apply_snapshot(subscription.current());
    tokio::spawn(async move {
        while let Some(snapshot) = subscription.next().await {
            mirror.bookmarks.lock().await.apply_snapshot(snapshot);
        }
    });

    let app = app::build_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    println!("🌐 Server running at http://{}", config.bind_addr);
    println!("   Try: curl 'http://{}/jobs'\n", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
