//! File explorer: directory snapshots, totals and change watching.

pub mod state;
pub mod tree;
pub mod watcher;

pub use state::{FileExplorer, FileSystemEvent};
pub use tree::{
    compute_stats, get_file_info, read_file_content, read_tree, FileInfo, FileNode, TreeStats,
};
pub use watcher::{DirectoryWatcher, FsEvent};
