use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Raw change notification: which paths changed and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsEvent {
    pub paths: Vec<String>,
    pub kind: String,
}

/// Recursive watch on a directory. Dropping it stops the watch.
pub struct DirectoryWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl DirectoryWatcher {
    /// Starts watching `path`. `on_change` runs on a background thread once per
    /// filesystem event until the watcher is dropped.
    pub fn start<F>(path: &Path, on_change: F) -> Result<Self>
    where
        F: Fn(FsEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(path, RecursiveMode::Recursive)?;

        let watched = path.to_path_buf();
        thread::spawn(move || {
            for res in rx {
                match res {
                    Ok(event) => on_change(FsEvent {
                        paths: event
                            .paths
                            .iter()
                            .map(|p| p.to_string_lossy().to_string())
                            .collect(),
                        kind: format!("{:?}", event.kind),
                    }),
                    Err(error) => {
                        log::warn!("[Watcher] {}: {error}", watched.display());
                    }
                }
            }
            log::debug!("[Watcher] Stopped watching {}", watched.display());
        });

        log::info!("[Watcher] Watching {}", path.display());
        Ok(Self {
            _watcher: watcher,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
