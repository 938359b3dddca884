use std::path::Path;

use serde::{Deserialize, Serialize};

use super::tree::{compute_stats, read_tree, FileNode, TreeStats};
use super::watcher::{DirectoryWatcher, FsEvent};
use crate::error::{CoreError, Result};
use crate::heroes::cache::now_millis;

/// Payload sent to the view after a watched directory changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemEvent {
    pub event_type: String,
    pub path: String,
    pub tree: FileNode,
}

/// State behind the file explorer panel.
#[derive(Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileExplorer {
    pub root_path: String,
    pub file_tree: Option<FileNode>,
    pub is_watching: bool,
    pub selected_path: String,
    pub loading: bool,
    /// Empty when there is no error.
    pub error: String,
    /// Milliseconds since the Unix epoch.
    pub last_update: i64,
    pub stats: TreeStats,
    #[serde(skip)]
    watcher: Option<DirectoryWatcher>,
}

impl FileExplorer {
    pub fn new() -> Self {
        Self {
            last_update: now_millis(),
            ..Self::default()
        }
    }

    pub fn set_root_path(&mut self, path: impl Into<String>) {
        self.root_path = path.into();
    }

    pub fn set_selected_path(&mut self, path: impl Into<String>) {
        self.selected_path = path.into();
    }

    pub fn clear_error(&mut self) {
        self.error.clear();
    }

    /// Reads the whole tree under `path` and makes it the current root.
    ///
    /// On failure the previous tree is kept and `error` describes the problem.
    pub fn load_directory(&mut self, path: &str) -> Result<()> {
        if !self.begin_load(path) {
            return Ok(());
        }
        self.finish_load(path, Self::read_root(path))
    }

    /// Marks a load of `path` as running. A blank path loads nothing and
    /// returns `false`.
    pub fn begin_load(&mut self, path: &str) -> bool {
        if path.trim().is_empty() {
            return false;
        }
        self.loading = true;
        self.error.clear();
        true
    }

    /// Stores a tree read by [`FileExplorer::read_root`] for `path`.
    pub fn finish_load(&mut self, path: &str, tree: Result<FileNode>) -> Result<()> {
        self.loading = false;
        match tree {
            Ok(tree) => {
                self.root_path = path.to_string();
                self.set_tree(tree);
                Ok(())
            }
            Err(error) => {
                self.error = format!("Failed to read directory: {error}");
                log::error!("[FileExplorer] Error loading directory {path}: {error}");
                Err(error)
            }
        }
    }

    pub fn refresh_directory(&mut self) -> Result<()> {
        if self.root_path.is_empty() {
            return Ok(());
        }
        let root = self.root_path.clone();
        self.load_directory(&root)
    }

    /// Starts a recursive watch on the current root. `on_change` is called for
    /// every raw event; it is expected to call [`FileExplorer::apply_change`].
    pub fn start_watching<F>(&mut self, on_change: F) -> Result<()>
    where
        F: Fn(FsEvent) + Send + 'static,
    {
        if self.root_path.trim().is_empty() {
            return Ok(());
        }

        self.watcher = None;
        match DirectoryWatcher::start(Path::new(&self.root_path), on_change) {
            Ok(watcher) => {
                self.watcher = Some(watcher);
                self.is_watching = true;
                self.error.clear();
                Ok(())
            }
            Err(error) => {
                self.is_watching = false;
                self.error = format!("Failed to start watching: {error}");
                log::error!(
                    "[FileExplorer] Error starting file watcher on {}: {error}",
                    self.root_path
                );
                Err(error)
            }
        }
    }

    pub fn stop_watching(&mut self) {
        self.watcher = None;
        self.is_watching = false;
    }

    /// Reloads the full tree after a change and returns the event to broadcast.
    pub fn apply_change(&mut self, event: &FsEvent) -> Option<FileSystemEvent> {
        if self.root_path.is_empty() {
            return None;
        }
        let root = self.root_path.clone();
        let tree = Self::read_root(&root);
        self.apply_tree(event, &root, tree)
    }

    /// Stores a tree reloaded for `root` after `event`.
    ///
    /// Returns `None` when the read failed or the explorer moved to another root
    /// in the meantime.
    pub fn apply_tree(
        &mut self,
        event: &FsEvent,
        root: &str,
        tree: Result<FileNode>,
    ) -> Option<FileSystemEvent> {
        if root != self.root_path {
            log::debug!("[FileExplorer] Ignoring reload of previous root {root}");
            return None;
        }

        match tree {
            Ok(tree) => {
                self.set_tree(tree.clone());
                Some(FileSystemEvent {
                    event_type: event.kind.clone(),
                    path: event
                        .paths
                        .first()
                        .cloned()
                        .unwrap_or_else(|| root.to_string()),
                    tree,
                })
            }
            Err(error) => {
                self.error = format!("Failed to read directory: {error}");
                log::error!("[FileExplorer] Reload after change failed for {root}: {error}");
                None
            }
        }
    }

    /// Reads the tree under `path`, failing when the path is gone.
    pub fn read_root(path: &str) -> Result<FileNode> {
        let root = Path::new(path);
        if !root.exists() {
            return Err(CoreError::NotFound(root.to_path_buf()));
        }
        read_tree(root)
    }

    fn set_tree(&mut self, tree: FileNode) {
        self.stats = compute_stats(&tree);
        self.file_tree = Some(tree);
        self.last_update = now_millis();
    }
}
