use std::{
    fs, io,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

/// File name suffix of the TypeScript entry files picked up by a build.
pub const SOURCE_SUFFIX: &str = ".ts";

/// Recursively collects every file below `dir` whose name ends with
/// `suffix`.
///
/// Directory entries are visited in file name order so that the same tree
/// always yields the same list, whatever order the platform lists them in.
/// Directories are never part of the result, even when their name ends with
/// `suffix`. Symlinks are followed; a link cycle is an error.
pub fn collect_files(dir: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
    if !fs::metadata(dir)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("{} is not a directory", dir.display()),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(suffix)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;
    use tempfile::TempDir;

    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_collect_files_nested() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("b.ts"));
        touch(&root.path().join("a.ts"));
        touch(&root.path().join("notes.md"));
        touch(&root.path().join("nested/deeper/c.ts"));
        touch(&root.path().join("nested/d.tsx"));

        let files = collect_files(root.path(), SOURCE_SUFFIX).unwrap();

        assert_eq!(
            files,
            vec![
                root.path().join("a.ts"),
                root.path().join("b.ts"),
                root.path().join("nested/deeper/c.ts"),
            ]
        );
    }

    #[test]
    fn test_collect_files_skips_directories_with_suffix() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("types.ts/inner.ts"));

        let files = collect_files(root.path(), SOURCE_SUFFIX).unwrap();

        assert_eq!(files, vec![root.path().join("types.ts/inner.ts")]);
    }

    #[test]
    fn test_collect_files_empty_directory() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("empty")).unwrap();

        let files = collect_files(root.path(), SOURCE_SUFFIX).unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn test_collect_files_missing_root() {
        let root = TempDir::new().unwrap();

        let error = collect_files(&root.path().join("missing"), SOURCE_SUFFIX)
            .unwrap_err();

        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_collect_files_root_is_a_file() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("client"));

        let error = collect_files(&root.path().join("client"), SOURCE_SUFFIX)
            .unwrap_err();

        assert_eq!(error.kind(), io::ErrorKind::NotADirectory);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_files_follows_symlinks() {
        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        touch(&outside.path().join("linked.ts"));
        std::os::unix::fs::symlink(outside.path(), root.path().join("lib"))
            .unwrap();

        let files = collect_files(root.path(), SOURCE_SUFFIX).unwrap();

        assert_eq!(files, vec![root.path().join("lib/linked.ts")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_files_symlink_loop() {
        let root = TempDir::new().unwrap();
        touch(&root.path().join("nested/a.ts"));
        std::os::unix::fs::symlink(
            root.path().join("nested"),
            root.path().join("nested/again"),
        )
        .unwrap();

        assert!(collect_files(root.path(), SOURCE_SUFFIX).is_err());
    }

    /// A file in the generated tree: its directory components, its stem and
    /// whether it carries the source suffix.
    fn tree() -> BoxedStrategy<Vec<(Vec<String>, String, bool)>> {
        prop::collection::vec(
            (
                prop::collection::vec("d_[a-z]{1,4}", 0..4),
                "f_[a-z]{1,4}",
                any::<bool>(),
            ),
            0..24,
        )
        .boxed()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_collect_files_finds_exactly_the_source_files(files in tree()) {
            let root = TempDir::new().unwrap();
            let mut expected = BTreeSet::new();
            for (directories, stem, is_source) in &files {
                let mut path = root.path().to_path_buf();
                path.extend(directories);
                let extension = if *is_source { "ts" } else { "txt" };
                path.push(format!("{stem}.{extension}"));
                touch(&path);
                if *is_source {
                    expected.insert(path);
                }
            }

            let collected = collect_files(root.path(), SOURCE_SUFFIX).unwrap();

            prop_assert_eq!(collected.len(), expected.len());
            for path in &collected {
                prop_assert!(path.is_file());
                prop_assert!(path.to_string_lossy().ends_with(SOURCE_SUFFIX));
            }
            let collected_set: BTreeSet<_> = collected.iter().cloned().collect();
            prop_assert_eq!(&collected_set, &expected);

            let again = collect_files(root.path(), SOURCE_SUFFIX).unwrap();
            prop_assert_eq!(collected, again);
        }
    }
}
