use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LsError {
    #[error("{0}")]
    ReadDir(#[from] walkdir::Error),

    #[error("{}: {}", .path.display(), .source)]
    Owner {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot determine working directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("failed to write listing: {0}")]
    Output(#[source] io::Error),
}
