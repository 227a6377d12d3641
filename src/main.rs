use intake_server::config::AppConfig;
use intake_server::routes::{self, AppState};
use intake_server::storage::{
    BlobStore, FileRecordStore, InMemoryRecordStore, LocalBlobStore, RecordStore,
};
use std::{path::PathBuf, sync::Arc};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = AppConfig::from_env();

    let records: Arc<dyn RecordStore> = match config.database_url.split_once("://") {
        Some(("memory", _)) => Arc::new(InMemoryRecordStore::new()),
        Some(("file", path)) => Arc::new(
            FileRecordStore::new(PathBuf::from(path)).expect("failed to initialize record store"),
        ),
        _ => panic!("unsupported DATABASE_URL scheme (expected memory:// or file://<dir>)"),
    };

    let blobs: Arc<dyn BlobStore> = Arc::new(
        LocalBlobStore::new(config.upload_dir.clone()).expect("failed to prepare upload directory"),
    );

    let state = Arc::new(AppState { blobs, records });
    let app = routes::app(state, &config.upload_dir);

    let addr = config.socket_addr();
    tracing::info!("server running on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}
