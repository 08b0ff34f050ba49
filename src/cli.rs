use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::SortOrder;
use crate::error::CliError;
use crate::slideshow::DEFAULT_INTERVAL_MS;

pub const HELP_KEYS: &str = "\
Key Bindings:
  Esc            : Stop slideshow / leave fullscreen / quit
  Right / Down   : Next image
  Left / Up      : Previous image
  Home / End     : First / last image
  + / -          : Zoom in / out
  Ctrl + / Ctrl -: Full resolution / fit to window
  Double-click   : Toggle full resolution / fit
  Drag           : Move image
  F11 / f        : Toggle fullscreen
  F5 / s         : Toggle slideshow
  i              : Toggle info overlay
  ?              : Toggle help overlay
";

#[derive(Parser, Debug)]
#[command(name = "peek", version, about = "A single-image and slideshow viewer", after_help = HELP_KEYS)]
pub struct Cli {
    /// File or directory to view
    pub path: Option<PathBuf>,

    /// Start the app in full screen mode
    #[arg(short, long)]
    pub fullscreen: bool,

    /// Interval between each slideshow image, in milliseconds
    #[arg(short, long, value_name = "MS", default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval: u64,

    /// Randomize order of files
    #[arg(short, long)]
    pub random: bool,

    /// Start slideshow when app starts
    #[arg(short, long)]
    pub slideshow: bool,

    /// Print the command line that reproduces these options and exit
    #[arg(long)]
    pub print_command: bool,
}

// ---------------------------------------------------------------------------
// Program identity
// ---------------------------------------------------------------------------

/// Built once in `main` and handed to whatever needs to show it.
#[derive(Debug, Clone, Copy)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub repository: &'static str,
}

impl AppInfo {
    pub fn from_build() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
        }
    }

    /// Shown when started without a path.
    pub fn about(&self, last_path: Option<&str>) -> String {
        let mut text = format!(
            "{name}\nVersion {version}\n\n\
             Usage: {name} <path> [<options>]\n\n\
             Options:\n\
             \x20   -f | --fullscreen               Start the app in full screen mode.\n\
             \x20   -i | --interval <milliseconds>  Interval between each slideshow image. Defaults to {interval}.\n\
             \x20   -r | --random                   Randomize order of files.\n\
             \x20   -s | --slideshow                Start slideshow when app starts.\n",
            name = self.name,
            version = self.version,
            interval = DEFAULT_INTERVAL_MS,
        );
        if !self.repository.is_empty() {
            text.push_str(&format!("\nSource and documentation available at {}\n", self.repository));
        }
        if let Some(last) = last_path {
            text.push_str(&format!("\nLast opened: {}\n", last));
        }
        text
    }
}

// ---------------------------------------------------------------------------
// Resolved startup options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Directory to list.
    pub path: PathBuf,
    /// File to select first, when a file was given.
    pub file: Option<PathBuf>,
    pub fullscreen: bool,
    pub interval: Duration,
    pub sort_order: SortOrder,
    pub slideshow: bool,
}

impl Options {
    /// Resolve `path` to an absolute directory (plus file, when one was
    /// named) and carry the flags over from `cli`.
    pub fn from_cli(cli: &Cli, path: &Path) -> Result<Self, CliError> {
        let resolved = fs::canonicalize(path).map_err(|_| CliError::InvalidPath(path.to_path_buf()))?;

        let (dir, file) = if resolved.is_dir() {
            (resolved, None)
        } else if resolved.is_file() {
            let parent = resolved
                .parent()
                .ok_or_else(|| CliError::NoParent(resolved.clone()))?
                .to_path_buf();
            (parent, Some(resolved))
        } else {
            return Err(CliError::InvalidPath(path.to_path_buf()));
        };

        Ok(Self {
            path: dir,
            file,
            fullscreen: cli.fullscreen,
            interval: Duration::from_millis(cli.interval),
            sort_order: if cli.random {
                SortOrder::Random
            } else {
                SortOrder::Alphabetical
            },
            slideshow: cli.slideshow,
        })
    }

    /// The path the user asked for: the file if one was given, else the dir.
    pub fn target(&self) -> &Path {
        self.file.as_deref().unwrap_or(&self.path)
    }

    /// Shell command that starts the viewer with these options.
    pub fn run_command(&self, exe: &Path) -> String {
        let mut args = vec![
            format!("\"{}\"", exe.display()),
            format!("\"{}\"", self.target().display()),
        ];
        if self.fullscreen {
            args.push("-f".to_string());
        }
        if self.sort_order == SortOrder::Random {
            args.push("-r".to_string());
        }
        if self.slideshow {
            args.push("-s".to_string());
            args.push(format!("-i {}", self.interval.as_millis()));
        }
        args.join(" ")
    }
}
