/*!
 * Selection store: per-file and per-folder inclusion state
 *
 * Folder operations are eager: selecting, excluding or clearing a folder
 * rewrites the file-level sets for every qualifying file currently below it.
 * Nothing is re-applied later, so a file created after the folder was
 * selected is not selected until the folder is selected again. Folder status
 * is always recomputed from the file sets and a live walk, except that
 * explicit folder membership takes precedence over the live count.
 */

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FileDogError, Result};
use crate::filter::ExtensionFilter;
use crate::scanner::Scanner;
use crate::types::{Action, Listing, NodeStatus, ScanOptions};
use crate::utils::normalize_lexically;

/// Complete selection state of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Scan base, `None` until chosen
    pub root: Option<PathBuf>,
    pub selected_files: BTreeSet<PathBuf>,
    pub excluded_files: BTreeSet<PathBuf>,
    pub selected_folders: BTreeSet<PathBuf>,
    pub excluded_folders: BTreeSet<PathBuf>,
    pub show_hidden: bool,
    pub include_all_extensions: bool,
}

impl SelectionState {
    /// Fresh state rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Scan toggles carried by this state
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            show_hidden: self.show_hidden,
            include_all_extensions: self.include_all_extensions,
        }
    }
}

/// Owner of a [`SelectionState`] together with the extension filter used to
/// interpret it
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    state: SelectionState,
    filter: ExtensionFilter,
}

impl SelectionStore {
    /// Create an empty store using `filter` for qualifying files
    pub fn new(filter: ExtensionFilter) -> Self {
        Self {
            state: SelectionState::default(),
            filter,
        }
    }

    /// Create a store around an existing state
    pub fn with_state(state: SelectionState, filter: ExtensionFilter) -> Self {
        Self { state, filter }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn filter(&self) -> &ExtensionFilter {
        &self.filter
    }

    pub fn root(&self) -> Option<&Path> {
        self.state.root.as_deref()
    }

    /// Replace the whole state, as after loading a session document
    pub fn replace_state(&mut self, state: SelectionState) {
        self.state = state;
    }

    /// Take the state out of the store
    pub fn into_state(self) -> SelectionState {
        self.state
    }

    /// Choose the scan base; existing sets are kept
    pub fn set_root(&mut self, root: impl Into<PathBuf>) {
        self.state.root = Some(normalize_lexically(&root.into()));
    }

    pub fn set_show_hidden(&mut self, show_hidden: bool) {
        self.state.show_hidden = show_hidden;
    }

    pub fn set_include_all_extensions(&mut self, include_all: bool) {
        self.state.include_all_extensions = include_all;
    }

    /// Scanner configured with the current toggles
    pub fn scanner(&self) -> Scanner<'_> {
        Scanner::new(&self.filter, self.state.scan_options())
    }

    /// One directory level under the current toggles
    pub fn list_children(&self, dir: &Path) -> Listing {
        self.scanner().list_children(dir)
    }

    /// Paths outside the root, missing from disk, or given before a root is
    /// chosen are ignored by every mutation. `path` must already be
    /// normalized.
    fn is_addressable(&self, path: &Path) -> bool {
        match self.root() {
            Some(root) => path.starts_with(normalize_lexically(root)) && path.exists(),
            None => false,
        }
    }

    /// Mark a file, or a folder and all its qualifying files, as selected
    pub fn select(&mut self, path: &Path, is_folder: bool) -> bool {
        let path = &normalize_lexically(path);
        if !self.is_addressable(path) {
            debug!("Ignoring select of {}", path.display());
            return false;
        }

        if is_folder {
            self.state.selected_folders.insert(path.to_path_buf());
            self.state.excluded_folders.remove(path);
            for file in self.scanner().qualifying_files(path) {
                self.state.excluded_files.remove(&file);
                self.state.selected_files.insert(file);
            }
        } else {
            self.state.selected_files.insert(path.to_path_buf());
            self.state.excluded_files.remove(path);
        }
        true
    }

    /// Mark a file, or a folder and all its qualifying files, as excluded
    pub fn exclude(&mut self, path: &Path, is_folder: bool) -> bool {
        let path = &normalize_lexically(path);
        if !self.is_addressable(path) {
            debug!("Ignoring exclude of {}", path.display());
            return false;
        }

        if is_folder {
            self.state.excluded_folders.insert(path.to_path_buf());
            self.state.selected_folders.remove(path);
            for file in self.scanner().qualifying_files(path) {
                self.state.selected_files.remove(&file);
                self.state.excluded_files.insert(file);
            }
        } else {
            self.state.excluded_files.insert(path.to_path_buf());
            self.state.selected_files.remove(path);
        }
        true
    }

    /// Drop any selection or exclusion of a file, or of a folder and all its
    /// qualifying files
    pub fn clear(&mut self, path: &Path, is_folder: bool) -> bool {
        let path = &normalize_lexically(path);
        if !self.is_addressable(path) {
            debug!("Ignoring clear of {}", path.display());
            return false;
        }

        if is_folder {
            self.state.selected_folders.remove(path);
            self.state.excluded_folders.remove(path);
            for file in self.scanner().qualifying_files(path) {
                self.state.selected_files.remove(&file);
                self.state.excluded_files.remove(&file);
            }
        } else {
            self.state.selected_files.remove(path);
            self.state.excluded_files.remove(path);
        }
        true
    }

    /// Cycle a path through select, exclude and clear
    ///
    /// The cycle follows the path's own membership only. A folder that merely
    /// shows a partial status counts as neither selected nor excluded.
    pub fn toggle(&mut self, path: &Path, is_folder: bool) -> Option<Action> {
        let path = &normalize_lexically(path);
        let (selected, excluded) = if is_folder {
            (&self.state.selected_folders, &self.state.excluded_folders)
        } else {
            (&self.state.selected_files, &self.state.excluded_files)
        };

        let action = if selected.contains(path) {
            Action::Exclude
        } else if excluded.contains(path) {
            Action::Clear
        } else {
            Action::Select
        };

        let applied = match action {
            Action::Select => self.select(path, is_folder),
            Action::Exclude => self.exclude(path, is_folder),
            Action::Clear => self.clear(path, is_folder),
        };
        applied.then_some(action)
    }

    /// Apply [`select`](Self::select) to several paths, returning how many applied
    pub fn select_many<'p, I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = (&'p Path, bool)>,
    {
        paths
            .into_iter()
            .filter(|(path, is_folder)| self.select(path, *is_folder))
            .count()
    }

    /// Apply [`exclude`](Self::exclude) to several paths, returning how many applied
    pub fn exclude_many<'p, I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = (&'p Path, bool)>,
    {
        paths
            .into_iter()
            .filter(|(path, is_folder)| self.exclude(path, *is_folder))
            .count()
    }

    /// Apply [`clear`](Self::clear) to several paths, returning how many applied
    pub fn clear_many<'p, I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = (&'p Path, bool)>,
    {
        paths
            .into_iter()
            .filter(|(path, is_folder)| self.clear(path, *is_folder))
            .count()
    }

    /// Select every folder and qualifying file under the root
    ///
    /// Unlike [`select`](Self::select), the excluded sets are left untouched,
    /// so a previously excluded file stays excluded from the resolved
    /// selection.
    pub fn select_all(&mut self) -> bool {
        let Some(root) = self.state.root.clone() else {
            return false;
        };

        let walked = self.scanner().walk(&root);
        self.state.selected_folders.extend(walked.folders);
        self.state.selected_files.extend(walked.files);

        let overlap = self
            .state
            .selected_files
            .intersection(&self.state.excluded_files)
            .count()
            + self
                .state
                .selected_folders
                .intersection(&self.state.excluded_folders)
                .count();
        if overlap > 0 {
            debug!(
                "select_all left {} path(s) both selected and excluded",
                overlap
            );
        }
        true
    }

    /// Empty all four sets
    pub fn clear_all(&mut self) {
        self.state.selected_files.clear();
        self.state.excluded_files.clear();
        self.state.selected_folders.clear();
        self.state.excluded_folders.clear();
    }

    /// Derived status of a file or folder
    pub fn status(&self, path: &Path, is_folder: bool) -> NodeStatus {
        let path = &normalize_lexically(path);
        if is_folder {
            self.folder_status(path)
        } else if self.state.excluded_files.contains(path) {
            NodeStatus::Excluded
        } else if self.state.selected_files.contains(path) {
            NodeStatus::Selected
        } else {
            NodeStatus::NotSelected
        }
    }

    fn folder_status(&self, path: &Path) -> NodeStatus {
        if self.state.excluded_folders.contains(path) {
            return NodeStatus::Excluded;
        }
        if self.state.selected_folders.contains(path) {
            return NodeStatus::Selected;
        }

        let (selected, total) = self
            .scanner()
            .count_selected(path, &self.state.selected_files);
        if total == 0 {
            NodeStatus::Empty
        } else if selected == 0 {
            NodeStatus::NotSelected
        } else if selected == total {
            NodeStatus::AllSelected
        } else {
            NodeStatus::Partial { selected, total }
        }
    }

    /// Flattened set of files to aggregate, sorted by full path
    ///
    /// Selected files plus the qualifying files of every selected folder that
    /// is not also excluded, minus every excluded file.
    pub fn resolve(&self) -> Vec<PathBuf> {
        let scanner = self.scanner();
        let mut resolved: BTreeSet<PathBuf> = self.state.selected_files.clone();

        for folder in &self.state.selected_folders {
            if self.state.excluded_folders.contains(folder) {
                continue;
            }
            resolved.extend(scanner.qualifying_files(folder));
        }

        let mut files: Vec<PathBuf> = resolved
            .into_iter()
            .filter(|f| !self.state.excluded_files.contains(f))
            .collect();
        files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        files
    }

    /// Number of files in the resolved selection
    pub fn selection_count(&self) -> usize {
        self.resolve().len()
    }

    /// Root of the session, or an error when none was chosen
    pub fn require_root(&self) -> Result<&Path> {
        self.root().ok_or(FileDogError::NoRoot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    fn fixture() -> (tempfile::TempDir, SelectionStore) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("F").join("sub")).unwrap();
        File::create(root.join("F").join("x.py")).unwrap();
        File::create(root.join("F").join("y.txt")).unwrap();
        File::create(root.join("F").join("sub").join("z.md")).unwrap();
        File::create(root.join("F").join("blob.bin")).unwrap();
        File::create(root.join("top.py")).unwrap();

        let mut store = SelectionStore::default();
        store.set_root(root);
        (dir, store)
    }

    #[test]
    fn test_select_folder_propagates_to_files() {
        let (dir, mut store) = fixture();
        let folder = dir.path().join("F");

        assert!(store.select(&folder, true));

        let state = store.state();
        assert!(state.selected_folders.contains(&folder));
        assert_eq!(state.selected_files.len(), 3);
        assert!(!state.selected_files.contains(&folder.join("blob.bin")));
    }

    #[test]
    fn test_exclude_moves_out_of_selected() {
        let (dir, mut store) = fixture();
        let folder = dir.path().join("F");
        store.select(&folder, true);

        store.exclude(&folder, true);

        let state = store.state();
        assert!(state.selected_folders.is_empty());
        assert!(state.selected_files.is_empty());
        assert!(state.excluded_folders.contains(&folder));
        assert_eq!(state.excluded_files.len(), 3);
        assert_eq!(store.status(&folder, true), NodeStatus::Excluded);
    }

    #[test]
    fn test_folder_status_precedence() {
        let (dir, mut store) = fixture();
        let folder = dir.path().join("F");

        assert_eq!(store.status(&folder, true), NodeStatus::NotSelected);

        store.select(&folder.join("x.py"), false);
        assert_eq!(
            store.status(&folder, true),
            NodeStatus::Partial {
                selected: 1,
                total: 3
            }
        );

        store.select(&folder.join("y.txt"), false);
        store.select(&folder.join("sub").join("z.md"), false);
        assert_eq!(store.status(&folder, true), NodeStatus::AllSelected);

        // Explicit folder membership wins over the live count
        store.select(&folder, true);
        store.exclude(&folder.join("x.py"), false);
        assert_eq!(store.status(&folder, true), NodeStatus::Selected);
    }

    #[test]
    fn test_empty_folder_status() {
        let (dir, store) = fixture();
        let empty = dir.path().join("E");
        fs::create_dir(&empty).unwrap();
        File::create(empty.join("only.bin")).unwrap();

        assert_eq!(store.status(&empty, true), NodeStatus::Empty);
    }

    #[test]
    fn test_toggle_cycle() {
        let (dir, mut store) = fixture();
        let file = dir.path().join("top.py");

        assert_eq!(store.toggle(&file, false), Some(Action::Select));
        assert_eq!(store.status(&file, false), NodeStatus::Selected);
        assert_eq!(store.toggle(&file, false), Some(Action::Exclude));
        assert_eq!(store.status(&file, false), NodeStatus::Excluded);
        assert_eq!(store.toggle(&file, false), Some(Action::Clear));
        assert_eq!(store.status(&file, false), NodeStatus::NotSelected);
    }

    #[test]
    fn test_toggle_partial_folder_selects() {
        let (dir, mut store) = fixture();
        let folder = dir.path().join("F");
        store.select(&folder.join("x.py"), false);

        assert_eq!(store.toggle(&folder, true), Some(Action::Select));
        assert_eq!(store.status(&folder, true), NodeStatus::Selected);
    }

    #[test]
    fn test_out_of_root_and_missing_paths_are_noops() {
        let (dir, mut store) = fixture();
        let other = tempfile::tempdir().unwrap();
        let outside = other.path().join("a.py");
        File::create(&outside).unwrap();
        let before = store.state().clone();

        assert!(!store.select(&outside, false));
        assert!(!store.exclude(&dir.path().join("ghost.py"), false));
        assert!(!store.clear(&dir.path().join("ghost"), true));
        assert_eq!(store.toggle(&outside, false), None);
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_parent_components_cannot_escape_root() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path().join("root");
        let outside = base.path().join("outside");
        fs::create_dir_all(root.join("F")).unwrap();
        fs::create_dir_all(&outside).unwrap();
        File::create(root.join("F").join("x.py")).unwrap();
        File::create(outside.join("secret.py")).unwrap();

        let mut store = SelectionStore::default();
        store.set_root(&root);

        let escaping = root.join("..").join("outside").join("secret.py");
        assert!(!store.select(&escaping, false));
        assert!(!store.exclude(&root.join("..").join("outside"), true));
        assert_eq!(store.toggle(&escaping, false), None);
        assert!(store.resolve().is_empty());
    }

    #[test]
    fn test_equivalent_spellings_share_one_entry() {
        let (dir, mut store) = fixture();
        let folder = dir.path().join("F");
        let root_name = dir.path().file_name().unwrap();
        let respelled = dir.path().join("..").join(root_name).join(".").join("F");

        assert!(store.select(&folder, true));
        assert!(store.select(&respelled, true));

        let state = store.state();
        assert_eq!(state.selected_folders.len(), 1);
        assert_eq!(state.selected_files.len(), 3);
        assert_eq!(store.resolve().len(), 3);
        assert_eq!(store.status(&respelled, true), NodeStatus::Selected);

        assert!(store.exclude(&respelled.join("x.py"), false));
        assert!(state_has_no_overlap(&store));
        assert!(!store.resolve().contains(&folder.join("x.py")));
    }

    fn state_has_no_overlap(store: &SelectionStore) -> bool {
        let state = store.state();
        state.selected_files.is_disjoint(&state.excluded_files)
            && state.selected_folders.is_disjoint(&state.excluded_folders)
    }

    #[test]
    fn test_no_root_is_noop() {
        let (dir, _) = fixture();
        let mut store = SelectionStore::default();

        assert!(!store.select(&dir.path().join("top.py"), false));
        assert!(!store.select_all());
        assert!(store.resolve().is_empty());
        assert!(matches!(store.require_root(), Err(FileDogError::NoRoot)));
    }

    #[test]
    fn test_select_all_keeps_exclusions() {
        let (dir, mut store) = fixture();
        let excluded = dir.path().join("F").join("x.py");
        store.exclude(&excluded, false);

        store.select_all();

        let state = store.state();
        assert!(state.selected_files.contains(&excluded));
        assert!(state.excluded_files.contains(&excluded));
        assert!(!store.resolve().contains(&excluded));
        assert_eq!(store.selection_count(), 3);
    }

    #[test]
    fn test_clear_all() {
        let (dir, mut store) = fixture();
        store.select_all();
        store.exclude(&dir.path().join("top.py"), false);

        store.clear_all();

        assert_eq!(
            store.state(),
            &SelectionState::with_root(dir.path().to_path_buf())
        );
    }

    #[test]
    fn test_many_variants_count_applied() {
        let (dir, mut store) = fixture();
        let root = dir.path();
        let paths = [
            (root.join("top.py"), false),
            (root.join("F"), true),
            (root.join("missing.py"), false),
        ];

        let applied = store.select_many(paths.iter().map(|(p, d)| (p.as_path(), *d)));
        assert_eq!(applied, 2);

        let cleared = store.clear_many(paths.iter().map(|(p, d)| (p.as_path(), *d)));
        assert_eq!(cleared, 2);
        assert!(store.state().selected_files.is_empty());

        let excluded = store.exclude_many([(root.join("top.py").as_path(), false)]);
        assert_eq!(excluded, 1);
    }

    #[test]
    fn test_resolve_is_sorted_by_full_path() {
        let (dir, mut store) = fixture();
        let root = dir.path();
        fs::create_dir(root.join("a.b")).unwrap();
        File::create(root.join("a.b").join("c.py")).unwrap();
        fs::create_dir(root.join("a")).unwrap();
        File::create(root.join("a").join("b.py")).unwrap();

        store.select_all();
        let resolved = store.resolve();

        let mut expected = resolved.clone();
        expected.sort_by_key(|p| p.to_string_lossy().to_string());
        assert_eq!(resolved, expected);
        let pos_dot = resolved.iter().position(|p| p.ends_with("a.b/c.py"));
        let pos_slash = resolved.iter().position(|p| p.ends_with("a/b.py"));
        assert!(pos_dot < pos_slash);
    }
}
