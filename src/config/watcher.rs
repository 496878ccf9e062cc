//! Hot reload of the TOML configuration file.
//!
//! The parent directory is watched rather than the file itself: editors
//! usually save by writing a temporary file and renaming it over the
//! original, which would silently detach a watch on the old inode.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::ProxyConfig;

/// Sends a fresh, validated `ProxyConfig` whenever the file changes.
pub struct ConfigWatcher {
    path: PathBuf,
    port_override: Option<u16>,
    updates: mpsc::UnboundedSender<ProxyConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its update channel.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ProxyConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            port_override: None,
            updates,
        };
        (watcher, rx)
    }

    /// Port given on the command line; re-applied to every reload.
    pub fn with_port_override(mut self, port: Option<u16>) -> Self {
        self.port_override = port;
        self
    }

    /// Start watching. Dropping the returned handle stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            port_override,
            updates,
        } = self;
        let dir = watch_dir(&path);
        let target = path.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(error = %e, "Config watch error");
                    return;
                }
            };
            if !touches(&event, &target) {
                return;
            }

            match load_config(Some(target.as_path()), port_override) {
                Ok(config) => {
                    tracing::info!(path = %target.display(), "Config file changed, reloading");
                    let _ = updates.send(config);
                }
                Err(e) => {
                    tracing::error!(
                        path = %target.display(),
                        error = %e,
                        "Ignoring invalid config file, keeping current configuration"
                    );
                }
            }
        })?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "Watching config file");
        Ok(watcher)
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// True for content changes that involve `target`.
fn touches(event: &Event, target: &Path) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|p| p.file_name().is_some() && p.file_name() == target.file_name())
}
