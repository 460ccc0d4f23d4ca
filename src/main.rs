//! # docshelf
//!
//! A markdown documentation shelf for the terminal.
//!
//! ## Usage
//!
//! Browse the docs listed in `./docs/list.json`:
//! ```sh
//! docshelf
//! ```
//!
//! List the documents of another project:
//! ```sh
//! docshelf ~/project --list
//! ```
//!
//! Print a document's outline:
//! ```sh
//! docshelf --toc docs/guide.md
//! ```

mod cli;

use clap::Parser as ClapParser;
use cli::Cli;
use color_eyre::Result;
use crossterm::ExecutableCommand;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use docshelf::location::{LocationStore, MemoryLocation, SessionLocation, encode_token};
use docshelf::store::FsSource;
use docshelf::{App, Config};
use env_logger::{Env, Target};
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::io::stdout;
use std::path::PathBuf;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    let mut config = Config::load();
    apply_overrides(&mut config, &args);

    if args.is_batch() {
        init_logging(&config, false);
        return cli::commands::run(&args, &config);
    }

    init_logging(&config, true);
    info!("starting viewer in {}", args.root.display());

    let location = open_location(&args);
    let watch = config.viewer.watch && !args.no_watch;
    let app = App::new(config, FsSource::new(&args.root), location);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen).inspect_err(|_| {
        disable_raw_mode().ok();
    })?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout());
    let mut terminal = ratatui::Terminal::new(backend).inspect_err(|_| {
        disable_raw_mode().ok();
    })?;

    let result = docshelf::tui::run(&mut terminal, app, watch);

    stdout().execute(LeaveAlternateScreen).ok();
    disable_raw_mode().ok();
    terminal.show_cursor().ok();

    result
}

/// Command-line flags take priority over the config file.
fn apply_overrides(config: &mut Config, args: &Cli) {
    if let Some(manifest) = &args.manifest {
        config.viewer.manifest = manifest.clone();
    }
    if let Some(theme) = &args.theme {
        config.ui.theme = theme.clone();
    }
    if args.unique_slugs {
        config.render.unique_slugs = true;
    }
}

/// The remembered location for this root, unless the command line names a
/// starting document.
fn open_location(args: &Cli) -> Box<dyn LocationStore> {
    let start = match (&args.doc, &args.location) {
        (Some(doc), _) => Some(encode_token(doc)),
        (None, Some(fragment)) => Some(fragment.clone()),
        (None, None) => None,
    };

    match SessionLocation::open(&args.root) {
        Ok(mut session) => {
            if let Some(fragment) = start {
                session.override_fragment(fragment);
            }
            Box::new(session)
        }
        Err(e) => {
            warn!("location will not be remembered: {}", e);
            Box::new(MemoryLocation::new(start.as_deref()))
        }
    }
}

/// Log to stderr in batch mode. The viewer owns the terminal, so it logs
/// to a file, or nowhere if no file can be opened.
fn init_logging(config: &Config, interactive: bool) {
    let mut builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(&config.logging.level));

    if interactive {
        match log_file(config) {
            Some(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            None => {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }

    let _ = builder.try_init();
}

fn log_file(config: &Config) -> Option<fs::File> {
    let path: PathBuf = config.logging.file.clone().or_else(|| {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|p| p.join("docshelf").join("docshelf.log"))
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
