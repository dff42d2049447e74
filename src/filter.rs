/*!
 * Extension filter deciding which files qualify for selection
 */

use std::collections::HashSet;
use std::path::Path;

use crate::utils::DEFAULT_EXTENSIONS;

/// Extension allow-list
///
/// Extensions are stored lowercased with their leading dot, so `rs`, `.rs`
/// and `.RS` all configure the same entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: HashSet<String>,
}

impl ExtensionFilter {
    /// Create a filter from an explicit allow-list
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize(ext.as_ref()))
            .collect();
        Self { extensions }
    }

    /// Check if a file qualifies given the include-all-extensions toggle
    pub fn should_include(&self, path: &Path, include_all: bool) -> bool {
        if include_all {
            return true;
        }

        match path.extension() {
            Some(ext) => {
                let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
                self.extensions.contains(&ext)
            }
            None => false,
        }
    }

    /// Number of extensions in the allow-list
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether the allow-list is empty
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Allow-listed extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter())
    }
}

fn normalize(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.');
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_list() {
        let filter = ExtensionFilter::default();
        assert!(filter.should_include(Path::new("/r/a.py"), false));
        assert!(filter.should_include(Path::new("/r/README.md"), false));
        assert!(filter.should_include(Path::new("/r/index.HTML"), false));
        assert!(!filter.should_include(Path::new("/r/logo.png"), false));
        assert!(!filter.should_include(Path::new("/r/Makefile"), false));
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        let filter = ExtensionFilter::new(["bashrc"]);
        assert!(!filter.should_include(Path::new("/home/u/.bashrc"), false));
        assert!(filter.should_include(Path::new("/home/u/.bashrc"), true));
    }

    #[test]
    fn test_include_all() {
        let filter = ExtensionFilter::new(Vec::<String>::new());
        assert!(filter.is_empty());
        assert!(filter.should_include(Path::new("/r/logo.png"), true));
        assert!(filter.should_include(Path::new("/r/Makefile"), true));
        assert!(!filter.should_include(Path::new("/r/a.py"), false));
    }

    #[test]
    fn test_normalization() {
        let filter = ExtensionFilter::new(["RS", ".toml", " md ", "", "."]);
        assert_eq!(filter.extensions(), vec![".md", ".rs", ".toml"]);
        assert!(filter.should_include(Path::new("lib.rs"), false));
        assert!(filter.should_include(Path::new("Cargo.TOML"), false));
    }
}
