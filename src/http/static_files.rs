//! Static site hosting.

use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::StaticFilesConfig;

/// Serve `root_dir` for unmatched paths and `index_file` for `/`.
pub fn mount(router: Router, config: &StaticFilesConfig) -> Router {
    if !config.enabled {
        return router;
    }

    let root = Path::new(&config.root_dir);
    let index = root.join(&config.index_file);

    tracing::debug!(root = ?root, index = ?index, "Serving static files");

    router
        .route_service("/", ServeFile::new(index))
        .fallback_service(ServeDir::new(root))
}
