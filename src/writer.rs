/*!
 * Combined-output writer: manifest header plus one delimited section per file
 */

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::warn;

use crate::error::{FileDogError, Result};
use crate::report::FileReportInfo;
use crate::selection::SelectionStore;
use crate::types::ScanOptions;
use crate::utils::{atomic_write, display_relative, DELIMITER_WIDTH};

/// Statistics gathered while combining files
#[derive(Debug, Clone, Default)]
pub struct CombineStatistics {
    /// Number of files written, including failed reads
    pub files_processed: usize,
    /// Number of files whose content could not be read
    pub files_failed: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Details for each file, in output order, keyed by relative path
    pub file_details: Vec<(String, FileReportInfo)>,
}

/// A rendered file section
struct Section {
    rel_path: String,
    text: String,
    info: FileReportInfo,
}

/// Writer concatenating resolved files into one document
pub struct CombinedWriter {
    /// Progress bar
    progress: Arc<ProgressBar>,
}

impl CombinedWriter {
    /// Create a new writer
    pub fn new(progress: Arc<ProgressBar>) -> Self {
        Self { progress }
    }

    /// Render the combined document for `files` into a string
    pub fn render(
        &self,
        files: &[PathBuf],
        root: &Path,
        flags: ScanOptions,
    ) -> (String, CombineStatistics) {
        self.render_at(files, root, flags, Local::now())
    }

    /// Render with an explicit generation time
    pub fn render_at(
        &self,
        files: &[PathBuf],
        root: &Path,
        flags: ScanOptions,
        generated: DateTime<Local>,
    ) -> (String, CombineStatistics) {
        let mut out = String::new();
        self.write_header(&mut out, files, root, flags, generated);

        // Reads run in parallel; collect keeps the input order
        let sections: Vec<Section> = files
            .par_iter()
            .map(|path| self.render_section(path, root))
            .collect();

        let mut stats = CombineStatistics::default();
        for section in sections {
            out.push_str(&section.text);
            stats.files_processed += 1;
            if section.info.error.is_some() {
                stats.files_failed += 1;
            }
            stats.total_lines += section.info.lines;
            stats.total_chars += section.info.chars;
            stats.file_details.push((section.rel_path, section.info));
        }

        (out, stats)
    }

    /// Write the combined document to any writer
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        files: &[PathBuf],
        root: &Path,
        flags: ScanOptions,
    ) -> io::Result<CombineStatistics> {
        let (document, stats) = self.render(files, root, flags);
        writer.write_all(document.as_bytes())?;
        writer.flush()?;
        Ok(stats)
    }

    /// Write the combined document to `output`
    ///
    /// Unreadable input files never abort; only an unwritable destination
    /// does, in which case `output` is left as it was.
    pub fn write(
        &self,
        files: &[PathBuf],
        root: &Path,
        flags: ScanOptions,
        output: &Path,
    ) -> Result<CombineStatistics> {
        let (document, stats) = self.render(files, root, flags);
        atomic_write(output, document.as_bytes()).map_err(|source| {
            FileDogError::Destination {
                path: output.to_path_buf(),
                source,
            }
        })?;
        Ok(stats)
    }

    fn write_header(
        &self,
        out: &mut String,
        files: &[PathBuf],
        root: &Path,
        flags: ScanOptions,
        generated: DateTime<Local>,
    ) {
        out.push_str(&format!(
            "# 🐕 FileDog Combined Files\n\
             # Generated on: {}\n\
             # Base directory: {}\n\
             # Total files: {}\n\
             # Hidden files shown: {}\n\
             # All extensions included: {}\n\n\
             # Selected Files:\n",
            generated.format("%Y-%m-%d %H:%M:%S"),
            root.display(),
            files.len(),
            flags.show_hidden,
            flags.include_all_extensions
        ));
        for path in files {
            out.push_str(&format!("# - {}\n", display_relative(path, root)));
        }
        out.push('\n');
    }

    fn render_section(&self, path: &Path, root: &Path) -> Section {
        self.progress.inc(1);

        let rel_path = display_relative(path, root);
        let delimiter = "=".repeat(DELIMITER_WIDTH);
        let mut text = format!(
            "\n\n{delim}\n# FILE: {rel}\n# Full path: {full}\n{delim}\n",
            delim = delimiter,
            rel = rel_path,
            full = path.display()
        );

        let info = match fs::read_to_string(path) {
            Ok(content) => {
                text.push_str(&content);
                if !content.ends_with('\n') {
                    text.push('\n');
                }
                FileReportInfo {
                    lines: content.lines().count(),
                    chars: content.chars().count(),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                text.push_str(&format!("\n# Failed to read {}: {}\n", path.display(), e));
                FileReportInfo {
                    error: Some(e.to_string()),
                    ..FileReportInfo::default()
                }
            }
        };

        Section {
            rel_path,
            text,
            info,
        }
    }
}

impl SelectionStore {
    /// Resolve the selection and combine it into `output`
    pub fn combine_to(
        &self,
        output: &Path,
        progress: Arc<ProgressBar>,
    ) -> Result<CombineStatistics> {
        let root = self.require_root()?;
        let files = self.resolve();
        if files.is_empty() {
            return Err(FileDogError::NothingSelected);
        }

        progress.set_length(files.len() as u64);
        CombinedWriter::new(progress).write(&files, root, self.state().scan_options(), output)
    }
}
