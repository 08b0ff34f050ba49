use std::path::PathBuf;
use thiserror::Error;

/// Recoverable conditions reported while building a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unable to get files from {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to find {} among the found files", path.display())]
    FileNotListed { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Image(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid path \"{}\"", .0.display())]
    InvalidPath(PathBuf),

    #[error("No parent directory for \"{}\"", .0.display())]
    NoParent(PathBuf),
}
