use crate::Error;
use std::path::{
    Path,
    PathBuf,
};

/// Lists every subdirectory of `root` as a candidate instance, sorted by name.
///
/// Contents are not inspected; a directory without `fuzzer_stats` is dropped
/// later by the parser. An empty root is not an error.
pub async fn discover_instances(root: &Path) -> Result<Vec<PathBuf>, Error> {
    match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return Err(Error::FindingsDirMissing(root.to_path_buf())),
    }

    let mut entries = tokio::fs::read_dir(root).await.map_err(|source| Error::ReadFindingsDir {
        path: root.to_path_buf(),
        source,
    })?;

    let mut dirs = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Stopped listing findings directory");
                break;
            }
        };
        // Follows symlinks so linked instance directories are picked up too.
        match tokio::fs::metadata(entry.path()).await {
            Ok(meta) if meta.is_dir() => dirs.push(entry.path()),
            Ok(_) => {}
            Err(e) => debug!(path = %entry.path().display(), error = %e, "Skipping entry"),
        }
    }

    dirs.sort();
    debug!(root = %root.display(), count = dirs.len(), "Discovered instance directories");
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    #[tokio::test]
    async fn lists_only_directories_in_order() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.child("secondary-2")).unwrap();
        std::fs::create_dir(root.child("main")).unwrap();
        std::fs::create_dir(root.child("secondary-1")).unwrap();
        std::fs::write(root.child("README"), "not an instance").unwrap();

        let dirs = discover_instances(root.path()).await.unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["main", "secondary-1", "secondary-2"]);
    }

    #[tokio::test]
    async fn empty_root_yields_no_instances() {
        let root = TempDir::new().unwrap();
        assert!(discover_instances(root.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_root_is_an_error() {
        let root = TempDir::new().unwrap();
        let missing = root.child("nope");
        let err = discover_instances(&missing).await.unwrap_err();
        assert!(matches!(err, Error::FindingsDirMissing(path) if path == missing));
    }
}
