/*!
 * Configuration handling for FileDog
 */

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

use crate::error::Result;
use crate::filter::ExtensionFilter;
use crate::{bail, ensure};

/// Default session document name
pub const DEFAULT_SESSION_FILE: &str = ".filedog.json";

/// Command-line arguments for FileDog
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "filedog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Select files in a directory tree and combine them into one document",
    long_about = "Marks files and folders of a directory tree as selected or excluded, keeps that \
                  selection in a session file, and concatenates the resolved files into a single \
                  annotated text document."
)]
pub struct Args {
    /// Session file holding the selection state
    #[clap(long, global = true, default_value = DEFAULT_SESSION_FILE)]
    pub session: PathBuf,

    /// Comma-separated extension allow-list (replaces the default list)
    #[clap(long, global = true, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Number of threads to use for reading files while combining
    #[clap(long, global = true, default_value = "4")]
    pub threads: usize,

    /// Log debug output to stderr
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

/// Operations on the session
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start a new session rooted at DIR
    Init {
        /// Base directory of the selection
        root: PathBuf,
        /// Show hidden files and folders
        #[clap(long)]
        show_hidden: bool,
        /// Accept files of every extension
        #[clap(long)]
        all_extensions: bool,
    },
    /// Print the whole tree with selection status
    Tree,
    /// List one directory level (defaults to the root)
    Ls { dir: Option<PathBuf> },
    /// Show the status of paths
    Status {
        #[clap(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Select files or folders
    Select {
        #[clap(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Exclude files or folders
    Exclude {
        #[clap(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Clear the selection of files or folders
    Clear {
        #[clap(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Cycle files or folders through select, exclude and clear
    Toggle {
        #[clap(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Select everything under the root
    SelectAll,
    /// Drop every selection and exclusion
    ClearAll,
    /// Change session settings
    Set {
        /// Show hidden files and folders
        #[clap(long, action = ArgAction::Set)]
        show_hidden: Option<bool>,
        /// Accept files of every extension
        #[clap(long, action = ArgAction::Set)]
        all_extensions: Option<bool>,
        /// Move the session to another base directory
        #[clap(long)]
        root: Option<PathBuf>,
    },
    /// Print the resolved file list
    List,
    /// Combine the resolved files into one document
    Combine {
        /// Output file (defaults to filedog_combined_<timestamp>.txt)
        output: Option<PathBuf>,
        /// Do not print the summary tables
        #[clap(long)]
        no_report: bool,
    },
    /// Save the session to another file
    Export { file: PathBuf },
    /// Replace the session with one saved in FILE
    Import { file: PathBuf },
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Session document path
    pub session_file: PathBuf,

    /// Extension allow-list
    pub filter: ExtensionFilter,

    /// Number of threads to use for processing
    pub num_threads: usize,

    /// Debug logging
    pub verbose: bool,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Self {
        let filter = if args.extensions.is_empty() {
            ExtensionFilter::default()
        } else {
            ExtensionFilter::new(&args.extensions)
        };

        Self {
            session_file: args.session.clone(),
            filter,
            num_threads: args.threads,
            verbose: args.verbose,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.num_threads > 0,
            Config,
            "thread count must be at least 1"
        );
        ensure!(
            !self.filter.is_empty(),
            Config,
            "extension list is empty"
        );

        if let Some(parent) = self.session_file.parent() {
            if parent != Path::new("") && !parent.is_dir() {
                bail!(
                    Config,
                    "session directory not found: {}",
                    parent.display()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileDogError;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["filedog", "tree"]);
        let config = Config::from_args(&args);

        assert_eq!(config.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
        assert_eq!(config.num_threads, 4);
        assert_eq!(config.filter, ExtensionFilter::default());
        assert!(matches!(args.command, Some(Command::Tree)));
        config.validate().unwrap();
    }

    #[test]
    fn test_extension_override() {
        let args = parse(&["filedog", "--extensions", "rs,toml", "list"]);
        let config = Config::from_args(&args);

        assert_eq!(config.filter.extensions(), vec![".rs", ".toml"]);
    }

    #[test]
    fn test_set_flags_parse_values() {
        let args = parse(&["filedog", "set", "--show-hidden", "true"]);
        match args.command {
            Some(Command::Set {
                show_hidden,
                all_extensions,
                root,
            }) => {
                assert_eq!(show_hidden, Some(true));
                assert_eq!(all_extensions, None);
                assert!(root.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::from_args(&parse(&["filedog", "list"]));
        config.num_threads = 0;
        assert!(matches!(config.validate(), Err(FileDogError::Config(_))));

        let mut config = Config::from_args(&parse(&["filedog", "list"]));
        config.session_file = PathBuf::from("/definitely/not/here/session.json");
        assert!(matches!(config.validate(), Err(FileDogError::Config(_))));

        let config = Config::from_args(&parse(&["filedog", "--extensions", ".", "list"]));
        assert!(matches!(config.validate(), Err(FileDogError::Config(_))));
    }
}
