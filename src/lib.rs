/*!
 * FileDog - select files in a directory tree and combine them into one document
 *
 * The library holds the headless selection engine: scanning, per-file and
 * per-folder selection state, resolution of the final file list, session
 * persistence and the combined-output writer. Any front end drives it through
 * a [`SelectionStore`].
 */

pub mod config;
pub mod error;
pub mod filter;
pub mod report;
pub mod scanner;
pub mod selection;
pub mod session;
pub mod tree;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::{Args, Command, Config};
pub use error::{FileDogError, Result};
pub use filter::ExtensionFilter;
pub use report::{CombineReport, FileReportInfo, ReportFormat, Reporter};
pub use scanner::Scanner;
pub use selection::{SelectionState, SelectionStore};
pub use tree::render_tree;
pub use types::{Action, Listing, NodeStatus, ScanOptions, TreeEntry};
pub use writer::{CombineStatistics, CombinedWriter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
