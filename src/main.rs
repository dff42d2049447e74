/*!
 * Command-line interface for FileDog
 */

use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use filedog::config::{Args, Command, Config};
use filedog::error::{FileDogError, Result};
use filedog::report::{CombineReport, ReportFormat, Reporter};
use filedog::selection::{SelectionState, SelectionStore};
use filedog::session;
use filedog::tree::render_tree;
use filedog::utils::{default_output_name, display_relative, normalize_lexically};

fn main() {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "filedog", &mut io::stdout());
        return;
    }

    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_args(&args);
    config.validate()?;

    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        warn!("Failed to set thread pool size: {}", e);
    }

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    if let Command::Init {
        root,
        show_hidden,
        all_extensions,
    } = &command
    {
        let root = absolute_dir(root)?;
        let mut state = SelectionState::with_root(root.clone());
        state.show_hidden = *show_hidden;
        state.include_all_extensions = *all_extensions;
        session::save_to_path(&state, &config.session_file)?;
        println!(
            "🐕 New session for {} saved to {}",
            root.display(),
            config.session_file.display()
        );
        return Ok(());
    }

    if !config.session_file.exists() {
        return Err(FileDogError::PathNotFound(format!(
            "{} (start a session with `filedog init <DIR>`)",
            config.session_file.display()
        )));
    }

    let mut store = SelectionStore::new(config.filter.clone());
    store.load_from(&config.session_file)?;
    debug!(
        "Session {} rooted at {:?}",
        config.session_file.display(),
        store.root()
    );

    let changed = execute(&mut store, command, &config)?;
    if changed {
        store.save_to(&config.session_file)?;
        println!("Selected: {} files", store.selection_count());
    }

    Ok(())
}

/// Run one session command, returning whether the session changed
fn execute(store: &mut SelectionStore, command: Command, config: &Config) -> Result<bool> {
    match command {
        Command::Init { .. } => Ok(false),
        Command::Tree => {
            let root = store.require_root()?;
            println!("{}/", root.display());
            print!("{}", render_tree(&store.tree()));
            Ok(false)
        }
        Command::Ls { dir } => {
            let root = store.require_root()?.to_path_buf();
            let dir = match dir {
                Some(dir) => absolute(&dir)?,
                None => root.clone(),
            };
            let listing = store.list_children(&dir);
            for folder in &listing.folders {
                println!(
                    "📁 {}/  {}",
                    display_relative(folder, &root),
                    store.status(folder, true)
                );
            }
            for file in &listing.files {
                println!(
                    "📄 {}  {}",
                    display_relative(file, &root),
                    store.status(file, false)
                );
            }
            Ok(false)
        }
        Command::Status { paths } => {
            let root = store.require_root()?.to_path_buf();
            for path in paths {
                let path = absolute(&path)?;
                let status = store.status(&path, path.is_dir());
                println!("{}  {}", display_relative(&path, &root), status);
            }
            Ok(false)
        }
        Command::Select { paths } => {
            apply(store, &paths, |s, p, d| s.select(p, d), "selected")
        }
        Command::Exclude { paths } => {
            apply(store, &paths, |s, p, d| s.exclude(p, d), "excluded")
        }
        Command::Clear { paths } => apply(store, &paths, |s, p, d| s.clear(p, d), "cleared"),
        Command::Toggle { paths } => {
            let mut changed = false;
            for path in paths {
                let path = absolute(&path)?;
                match store.toggle(&path, path.is_dir()) {
                    Some(action) => {
                        println!("{} {}", action, path.display());
                        changed = true;
                    }
                    None => warn!(
                        "Ignored {}: missing or not under the session root",
                        path.display()
                    ),
                }
            }
            Ok(changed)
        }
        Command::SelectAll => {
            store.require_root()?;
            Ok(store.select_all())
        }
        Command::ClearAll => {
            store.clear_all();
            Ok(true)
        }
        Command::Set {
            show_hidden,
            all_extensions,
            root,
        } => {
            if let Some(show_hidden) = show_hidden {
                store.set_show_hidden(show_hidden);
            }
            if let Some(all_extensions) = all_extensions {
                store.set_include_all_extensions(all_extensions);
            }
            if let Some(root) = root {
                store.set_root(absolute_dir(&root)?);
            }
            Ok(true)
        }
        Command::List => {
            let root = store.require_root()?.to_path_buf();
            for file in store.resolve() {
                println!("{}", display_relative(&file, &root));
            }
            Ok(false)
        }
        Command::Combine { output, no_report } => {
            combine(store, output, no_report)?;
            Ok(false)
        }
        Command::Export { file } => {
            store.save_to(&file)?;
            println!("💾 Selection saved to {}", file.display());
            Ok(false)
        }
        Command::Import { file } => {
            store.load_from(&file)?;
            println!(
                "📂 Selection loaded from {} into {}",
                file.display(),
                config.session_file.display()
            );
            Ok(true)
        }
    }
}

fn apply<F>(store: &mut SelectionStore, paths: &[PathBuf], op: F, verb: &str) -> Result<bool>
where
    F: Fn(&mut SelectionStore, &Path, bool) -> bool,
{
    let mut changed = false;
    for path in paths {
        let path = absolute(path)?;
        if op(store, &path, path.is_dir()) {
            println!("{} {}", verb, path.display());
            changed = true;
        } else {
            warn!(
                "Ignored {}: missing or not under the session root",
                path.display()
            );
        }
    }
    Ok(changed)
}

fn combine(store: &SelectionStore, output: Option<PathBuf>, no_report: bool) -> Result<()> {
    let output = output.unwrap_or_else(|| PathBuf::from(default_output_name()));

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_bar} {pos}/{len} ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.set_prefix("🔧 Combining");

    let start_time = Instant::now();
    let stats = store.combine_to(&output, Arc::new(progress.clone()))?;
    let duration = start_time.elapsed();
    progress.finish_and_clear();

    if no_report {
        println!(
            "Combined {} files into {}",
            stats.files_processed,
            output.display()
        );
    } else {
        let report = CombineReport::new(output.display().to_string(), duration, stats);
        Reporter::new(ReportFormat::ConsoleTable).print_report(&report);
    }

    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(normalize_lexically(&std::path::absolute(path)?))
}

fn absolute_dir(path: &Path) -> Result<PathBuf> {
    let path = absolute(path)?;
    if !path.is_dir() {
        return Err(FileDogError::PathNotFound(format!(
            "'{}' is not a valid directory",
            path.display()
        )));
    }
    Ok(path)
}
