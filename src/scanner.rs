/*!
 * Directory scanning: one-level listings and qualifying-descendant walks
 */

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::filter::ExtensionFilter;
use crate::types::{Listing, ScanOptions};
use crate::utils::is_hidden;

/// Scanner for directory contents
///
/// Stateless between calls: every listing and walk reads the filesystem
/// again, so results always reflect the current tree.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    /// Extension allow-list applied to files
    filter: &'a ExtensionFilter,
    /// Hidden and extension toggles
    options: ScanOptions,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner
    pub fn new(filter: &'a ExtensionFilter, options: ScanOptions) -> Self {
        Self { filter, options }
    }

    /// Check if a file qualifies for selection under the current toggles
    pub fn is_qualifying_file(&self, path: &Path) -> bool {
        self.filter
            .should_include(path, self.options.include_all_extensions)
    }

    /// List one directory level, folders and files each sorted by name
    ///
    /// An unreadable directory yields an empty listing.
    pub fn list_children(&self, dir: &Path) -> Listing {
        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(e) => {
                warn!("Cannot read directory {}: {}", dir.display(), e);
                return Listing::default();
            }
        };

        let mut entries: Vec<PathBuf> = read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect();
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut listing = Listing::default();
        for path in entries {
            if !self.options.show_hidden && is_hidden(&path) {
                continue;
            }

            if path.is_dir() {
                listing.folders.push(path);
            } else if self.is_qualifying_file(&path) {
                listing.files.push(path);
            }
        }

        listing
    }

    /// Walk every descendant of `dir`, returning qualifying files and the
    /// folders traversed
    ///
    /// Hidden folders are pruned unless hidden entries are shown. Symlinked
    /// folders are reported but never descended into.
    pub fn walk(&self, dir: &Path) -> Listing {
        let show_hidden = self.options.show_hidden;
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || show_hidden || !is_hidden(e.path()));

        let mut listing = Listing::default();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };

            if is_folder_entry(&entry) {
                listing.folders.push(entry.into_path());
            } else if self.is_qualifying_file(entry.path()) {
                listing.files.push(entry.into_path());
            }
        }

        listing
    }

    /// Qualifying files anywhere below `dir`
    pub fn qualifying_files(&self, dir: &Path) -> Vec<PathBuf> {
        self.walk(dir).files
    }

    /// Count qualifying files below `dir` as `(selected, total)`
    pub fn count_selected(&self, dir: &Path, selected: &BTreeSet<PathBuf>) -> (usize, usize) {
        let files = self.qualifying_files(dir);
        let hits = files.iter().filter(|f| selected.contains(*f)).count();
        (hits, files.len())
    }
}

fn is_folder_entry(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_symlink() {
        return entry.path().is_dir();
    }
    file_type.is_dir()
}
