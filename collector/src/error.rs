use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Findings directory does not exist or is not a directory: {0}")]
    FindingsDirMissing(PathBuf),
    #[error("Failed to list findings directory {path}: {source}")]
    ReadFindingsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
