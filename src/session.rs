/*!
 * Session documents: JSON persistence of a selection state
 *
 * Field names match the documents written by earlier FileDog releases, so
 * saved selections keep loading. Missing fields default to empty or false;
 * the timestamp is informational and ignored on load.
 */

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FileDogError, Result};
use crate::selection::{SelectionState, SelectionStore};
use crate::utils::atomic_write;

/// On-disk form of a [`SelectionState`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionDocument {
    #[serde(rename = "base_directory", alias = "root", default)]
    pub root: Option<PathBuf>,
    #[serde(alias = "selectedFiles", default)]
    pub selected_files: Vec<PathBuf>,
    #[serde(alias = "selectedFolders", default)]
    pub selected_folders: Vec<PathBuf>,
    #[serde(alias = "excludedFiles", default)]
    pub excluded_files: Vec<PathBuf>,
    #[serde(alias = "excludedFolders", default)]
    pub excluded_folders: Vec<PathBuf>,
    #[serde(alias = "showHidden", default)]
    pub show_hidden: bool,
    #[serde(alias = "includeAllExtensions", default)]
    pub include_all_extensions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SessionDocument {
    /// Snapshot a state, stamped with the current local time
    pub fn from_state(state: &SelectionState) -> Self {
        Self {
            root: state.root.clone(),
            selected_files: state.selected_files.iter().cloned().collect(),
            selected_folders: state.selected_folders.iter().cloned().collect(),
            excluded_files: state.excluded_files.iter().cloned().collect(),
            excluded_folders: state.excluded_folders.iter().cloned().collect(),
            show_hidden: state.show_hidden,
            include_all_extensions: state.include_all_extensions,
            timestamp: Some(Local::now().to_rfc3339()),
        }
    }

    /// Rebuild the state described by this document
    pub fn into_state(self) -> SelectionState {
        SelectionState {
            root: self.root,
            selected_files: collect(self.selected_files),
            selected_folders: collect(self.selected_folders),
            excluded_files: collect(self.excluded_files),
            excluded_folders: collect(self.excluded_folders),
            show_hidden: self.show_hidden,
            include_all_extensions: self.include_all_extensions,
        }
    }
}

fn collect(paths: Vec<PathBuf>) -> BTreeSet<PathBuf> {
    paths.into_iter().collect()
}

/// Serialize a state to a pretty-printed JSON document
pub fn save(state: &SelectionState) -> Result<String> {
    Ok(serde_json::to_string_pretty(&SessionDocument::from_state(
        state,
    ))?)
}

/// Parse a JSON document into a state
pub fn load(document: &str) -> Result<SelectionState> {
    parse(document, None)
}

fn parse(document: &str, path: Option<&Path>) -> Result<SelectionState> {
    let doc: SessionDocument =
        serde_json::from_str(document).map_err(|source| FileDogError::InvalidSession {
            path: path.map(Path::to_path_buf),
            source,
        })?;
    Ok(doc.into_state())
}

/// Write a state to `path`; the file is replaced atomically
pub fn save_to_path(state: &SelectionState, path: &Path) -> Result<()> {
    let json = save(state)?;
    atomic_write(path, json.as_bytes()).map_err(|source| FileDogError::Destination {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Saved session to {}", path.display());
    Ok(())
}

/// Read a state from `path`
pub fn load_from_path(path: &Path) -> Result<SelectionState> {
    let content = fs::read_to_string(path)?;
    let state = parse(&content, Some(path))?;
    debug!("Loaded session from {}", path.display());
    Ok(state)
}

impl SelectionStore {
    /// Save the store's state to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        save_to_path(self.state(), path)
    }

    /// Replace the store's state with the one saved at `path`
    ///
    /// On failure the current state is left untouched.
    pub fn load_from(&mut self, path: &Path) -> Result<()> {
        let state = load_from_path(path)?;
        self.replace_state(state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> SelectionState {
        let mut state = SelectionState::with_root("/work/project");
        state.selected_files.insert("/work/project/a.py".into());
        state.selected_files.insert("/work/project/F/y.txt".into());
        state.excluded_files.insert("/work/project/F/x.py".into());
        state.selected_folders.insert("/work/project/F".into());
        state.excluded_folders.insert("/work/project/build".into());
        state.show_hidden = true;
        state
    }

    #[test]
    fn test_round_trip() {
        let state = sample_state();
        let json = save(&state).unwrap();
        assert_eq!(load(&json).unwrap(), state);
    }

    #[test]
    fn test_document_fields() {
        let json = save(&sample_state()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["base_directory"], "/work/project");
        assert_eq!(value["show_hidden"], true);
        assert_eq!(value["include_all_extensions"], false);
        assert_eq!(value["selected_files"].as_array().unwrap().len(), 2);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_missing_fields_default() {
        let state = load(r#"{"base_directory": "/r", "selected_files": ["/r/a.py"]}"#).unwrap();

        assert_eq!(state.root.as_deref(), Some(Path::new("/r")));
        assert_eq!(state.selected_files.len(), 1);
        assert!(state.selected_folders.is_empty());
        assert!(state.excluded_files.is_empty());
        assert!(state.excluded_folders.is_empty());
        assert!(!state.show_hidden);
        assert!(!state.include_all_extensions);

        assert_eq!(load("{}").unwrap(), SelectionState::default());
    }

    #[test]
    fn test_camel_case_aliases() {
        let state = load(
            r#"{"root": "/r", "selectedFolders": ["/r/F"], "includeAllExtensions": true}"#,
        )
        .unwrap();

        assert_eq!(state.root.as_deref(), Some(Path::new("/r")));
        assert!(state.selected_folders.contains(Path::new("/r/F")));
        assert!(state.include_all_extensions);
    }

    #[test]
    fn test_corrupt_document() {
        assert!(matches!(
            load(r#"{"base_directory": "/r", "selected_files": ["#),
            Err(FileDogError::InvalidSession { path: None, .. })
        ));
        assert!(matches!(
            load("[1, 2, 3]"),
            Err(FileDogError::InvalidSession { .. })
        ));
    }

    #[test]
    fn test_load_from_keeps_state_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();

        let mut store = SelectionStore::with_state(sample_state(), Default::default());
        let err = store.load_from(&path).unwrap_err();

        assert!(matches!(
            err,
            FileDogError::InvalidSession { path: Some(ref p), .. } if *p == path
        ));
        assert!(err.to_string().contains("broken.json"));
        assert_eq!(store.state(), &sample_state());
    }

    #[test]
    fn test_save_to_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("session.json");

        let err = save_to_path(&sample_state(), &path).unwrap_err();
        assert!(matches!(err, FileDogError::Destination { .. }));
        assert!(!path.exists());
    }
}
