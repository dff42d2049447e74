/*!
 * Core types and data structures for the FileDog engine
 */

use std::fmt;
use std::path::PathBuf;

/// Derived selection status of a file or folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Explicitly excluded
    Excluded,
    /// Explicitly selected (files, or folders present in the selected set)
    Selected,
    /// Folder whose qualifying files are all selected
    AllSelected,
    /// Folder without any qualifying files
    Empty,
    /// Nothing selected
    NotSelected,
    /// Folder with some of its qualifying files selected
    Partial { selected: usize, total: usize },
}

impl NodeStatus {
    /// Whether the node contributes everything it holds
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected | Self::AllSelected)
    }

    /// Whether the node carries no selection at all
    pub fn is_unselected(&self) -> bool {
        matches!(self, Self::NotSelected | Self::Empty)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excluded => write!(f, "Excluded"),
            Self::Selected => write!(f, "Selected"),
            Self::AllSelected => write!(f, "All Selected"),
            Self::Empty => write!(f, "Empty"),
            Self::NotSelected => write!(f, "None"),
            Self::Partial { selected, total } => write!(f, "Partial ({}/{})", selected, total),
        }
    }
}

/// Action applied by a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Select,
    Exclude,
    Clear,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "selected"),
            Self::Exclude => write!(f, "excluded"),
            Self::Clear => write!(f, "cleared"),
        }
    }
}

/// Toggles shared by scanning and status derivation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Include entries whose name starts with the hidden marker
    pub show_hidden: bool,
    /// Accept every file regardless of extension
    pub include_all_extensions: bool,
}

/// Folders and files found under a directory, each sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub folders: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// One row of the display tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Absolute path of the entry
    pub path: PathBuf,
    /// Base name
    pub name: String,
    /// Depth below the root (children of the root are at depth 0)
    pub depth: usize,
    /// Whether the entry is a folder
    pub is_dir: bool,
    /// Whether the entry is the last among its siblings
    pub is_last: bool,
    /// Size in bytes, files only
    pub size: Option<u64>,
    /// Derived selection status
    pub status: NodeStatus,
}
