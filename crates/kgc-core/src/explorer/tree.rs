use std::cmp::Ordering;
use std::fs::{self, File, Metadata};
use std::io::Read;
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Snapshot of a file or directory. Directories carry their children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Seconds since the Unix epoch, as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub total_files: u64,
    /// Not counting the root itself.
    pub total_directories: u64,
    pub total_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub is_file: bool,
    pub modified: Option<u64>,
}

/// Reads `path` recursively. Children that cannot be read are left out.
///
/// Within a directory, subdirectories come first, then files, each by name.
pub fn read_tree(path: &Path) -> Result<FileNode> {
    let metadata = fs::metadata(path)?;
    let name = file_name(path);
    let modified = modified_secs(&metadata).map(|secs| secs.to_string());

    if metadata.is_file() {
        return Ok(FileNode {
            name,
            path: path.to_string_lossy().to_string(),
            is_directory: false,
            children: None,
            size: Some(metadata.len()),
            modified,
        });
    }

    let mut children = Vec::new();
    for entry in fs::read_dir(path)? {
        let Ok(entry) = entry else {
            continue;
        };
        match read_tree(&entry.path()) {
            Ok(child) => children.push(child),
            Err(error) => {
                log::debug!("[Explorer] Skipping {}: {error}", entry.path().display());
            }
        }
    }

    children.sort_by(|left, right| match (left.is_directory, right.is_directory) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => left.name.cmp(&right.name),
    });

    Ok(FileNode {
        name,
        path: path.to_string_lossy().to_string(),
        is_directory: true,
        children: Some(children),
        size: None,
        modified,
    })
}

/// Totals over the whole tree. The root directory is not counted.
pub fn compute_stats(tree: &FileNode) -> TreeStats {
    let (files, dirs, size) = fold(tree);
    TreeStats {
        total_files: files,
        total_directories: dirs.saturating_sub(1),
        total_size: size,
    }
}

fn fold(node: &FileNode) -> (u64, u64, u64) {
    let mut files = u64::from(!node.is_directory);
    let mut dirs = u64::from(node.is_directory);
    let mut size = node.size.unwrap_or(0);

    for child in node.children.iter().flatten() {
        let (child_files, child_dirs, child_size) = fold(child);
        files += child_files;
        dirs += child_dirs;
        size += child_size;
    }
    (files, dirs, size)
}

pub fn get_file_info(path: &Path) -> Result<FileInfo> {
    let metadata = fs::metadata(path)?;
    Ok(FileInfo {
        name: file_name(path),
        path: path.to_string_lossy().to_string(),
        size: metadata.len(),
        is_file: metadata.is_file(),
        modified: modified_secs(&metadata),
    })
}

/// Reads a file as text. Files with a NUL byte in their first KiB are refused.
pub fn read_file_content(path: &Path) -> Result<String> {
    let mut head = [0u8; 1024];
    let read = File::open(path)?.read(&mut head)?;
    if head[..read].contains(&0) {
        return Err(CoreError::InvalidInput(
            "Binary file cannot be displayed as text".to_string(),
        ));
    }
    Ok(fs::read_to_string(path)?)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn modified_secs(metadata: &Metadata) -> Option<u64> {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_secs())
}
