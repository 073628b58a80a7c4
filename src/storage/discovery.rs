use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

/// The file extension of persisted volumes.
pub const VOLUME_EXTENSION: &str = "nrrd";

/// Collects the dataset files at a location.
///
/// A directory is searched recursively for files with the given extension;
/// the result is sorted by path so datasets are always processed in the same
/// order. A file path is returned as-is when it carries the extension. Any
/// other location yields no files.
#[must_use]
pub fn collect_volume_paths(location: &Path, extension: &str) -> Vec<PathBuf> {
    if location.is_dir() {
        let mut paths: Vec<_> = WalkDir::new(location)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension() == Some(OsStr::new(extension)))
            .map(walkdir::DirEntry::into_path)
            .collect();
        paths.sort();
        tracing::debug!(
            "Found {} .{extension} files under {}",
            paths.len(),
            location.display()
        );
        paths
    } else if location.is_file() && location.extension() == Some(OsStr::new(extension)) {
        vec![location.to_path_buf()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_directories_in_sorted_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("b")).unwrap();
        std::fs::write(root.join("b").join("inner.nrrd"), b"").unwrap();
        std::fs::write(root.join("z.nrrd"), b"").unwrap();
        std::fs::write(root.join("a.nrrd"), b"").unwrap();
        std::fs::write(root.join("notes.txt"), b"").unwrap();

        let paths = collect_volume_paths(root, VOLUME_EXTENSION);

        assert_eq!(
            paths,
            vec![
                root.join("a.nrrd"),
                root.join("b").join("inner.nrrd"),
                root.join("z.nrrd"),
            ]
        );
    }

    #[test]
    fn single_file_requires_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let volume = tmp.path().join("density.nrrd");
        let other = tmp.path().join("density.json");
        std::fs::write(&volume, b"").unwrap();
        std::fs::write(&other, b"").unwrap();

        assert_eq!(collect_volume_paths(&volume, VOLUME_EXTENSION), vec![volume]);
        assert!(collect_volume_paths(&other, VOLUME_EXTENSION).is_empty());
        assert!(collect_volume_paths(&tmp.path().join("missing"), VOLUME_EXTENSION).is_empty());
    }
}
