/*!
 * Display tree built from repeated one-level listings
 *
 * Folders come before files at every level, each sorted by name, and
 * children follow their folder depth-first.
 */

use std::fs;
use std::path::Path;

use crate::selection::SelectionStore;
use crate::types::{NodeStatus, TreeEntry};
use crate::utils::format_file_size;

impl SelectionStore {
    /// Every visible entry below the root, depth-first, with its status
    pub fn tree(&self) -> Vec<TreeEntry> {
        let mut entries = Vec::new();
        if let Some(root) = self.root() {
            self.collect_level(root, 0, &mut entries);
        }
        entries
    }

    fn collect_level(&self, dir: &Path, depth: usize, entries: &mut Vec<TreeEntry>) {
        let listing = self.list_children(dir);
        let count = listing.folders.len() + listing.files.len();
        let mut index = 0;

        for folder in &listing.folders {
            index += 1;
            entries.push(TreeEntry {
                path: folder.clone(),
                name: file_name(folder),
                depth,
                is_dir: true,
                is_last: index == count,
                size: None,
                status: self.status(folder, true),
            });
            self.collect_level(folder, depth + 1, entries);
        }

        for file in &listing.files {
            index += 1;
            entries.push(TreeEntry {
                path: file.clone(),
                name: file_name(file),
                depth,
                is_dir: false,
                is_last: index == count,
                size: fs::metadata(file).ok().map(|m| m.len()),
                status: self.status(file, false),
            });
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn status_marker(status: &NodeStatus) -> &'static str {
    match status {
        NodeStatus::Excluded => "[-]",
        NodeStatus::Selected | NodeStatus::AllSelected => "[x]",
        NodeStatus::Partial { .. } => "[~]",
        NodeStatus::Empty | NodeStatus::NotSelected => "[ ]",
    }
}

/// Render tree entries with box-drawing guides, one line per entry
pub fn render_tree(entries: &[TreeEntry]) -> String {
    let mut out = String::new();
    // open[d] is true while the ancestor at depth d still has siblings below
    let mut open: Vec<bool> = Vec::new();

    for entry in entries {
        open.truncate(entry.depth);

        let mut prefix = String::new();
        for &has_more in &open {
            prefix.push_str(if has_more { "│  " } else { "   " });
        }
        prefix.push_str(if entry.is_last { "└─ " } else { "├─ " });

        let detail = match (entry.is_dir, entry.size) {
            (true, _) => format!("{}/", entry.name),
            (false, Some(size)) => format!("{} ({})", entry.name, format_file_size(size)),
            (false, None) => entry.name.clone(),
        };
        out.push_str(&format!(
            "{} {}{}  {}\n",
            status_marker(&entry.status),
            prefix,
            detail,
            entry.status
        ));

        if entry.is_dir {
            open.push(!entry.is_last);
        }
    }

    out
}
