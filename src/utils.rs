/*!
 * Utility functions for FileDog
 */

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use chrono::Local;
use once_cell::sync::Lazy;

/// Prefix marking hidden entries on the host platform
pub const HIDDEN_PREFIX: char = '.';

/// Width of the `=` delimiter lines in combined output
pub const DELIMITER_WIDTH: usize = 80;

/// Check whether a path's base name marks it as hidden
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with(HIDDEN_PREFIX))
        .unwrap_or(false)
}

/// Path relative to `root` for display, or the path itself when it is not
/// under `root`
pub fn display_relative(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
        _ => path.display().to_string(),
    }
}

/// Resolve `.` and `..` components without touching the filesystem
///
/// Symlinks are not followed, so `link/..` collapses to the directory holding
/// `link`. A `..` at the filesystem root stays at the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Default file name for a combined output document
pub fn default_output_name() -> String {
    format!("filedog_combined_{}.txt", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if size >= MB {
        format!("{}MB", size / MB)
    } else if size >= KB {
        format!("{}KB", size / KB)
    } else {
        format!("{}B", size)
    }
}

/// Write `content` to `target` through a sibling temporary file and a rename,
/// so `target` is either fully written or left untouched.
pub fn atomic_write(target: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = temp_sibling(target);

    let result = File::create(&temp_path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, target).inspect_err(|_| {
        let _ = fs::remove_file(&temp_path);
    })
}

fn temp_sibling(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    target.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

/// Default extensions accepted by the extension filter
pub static DEFAULT_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Source code
        ".py", ".js", ".ts", ".tsx", ".jsx", ".dart", ".rs", ".go", ".java", ".kt", ".c", ".h",
        ".cpp", ".hpp", ".cs", ".rb", ".php", ".swift", ".sh", ".sql",
        // Markup & styles
        ".html", ".xml", ".md", ".rst", ".css", ".scss", ".vue", ".svelte",
        // Config & data
        ".json", ".yaml", ".yml", ".toml", ".ini", ".cfg", ".csv",
        // Plain text
        ".txt",
    ]
});
