use std::sync::Arc;

use crate::config::Config;
use crate::uploads::naming::FileNamer;
use crate::uploads::storage::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: UploadStore,
    /// Pluggable stored-name strategy. Default: TimestampNamer.
    pub namer: Arc<dyn FileNamer>,
}

impl AppState {
    pub fn new(config: Config, namer: Arc<dyn FileNamer>) -> Self {
        let store = UploadStore::new(config.upload_root.clone());
        Self {
            config: Arc::new(config),
            store,
            namer,
        }
    }
}
