//! Source tree staging
//!
//! The mounted source tree is copied to a scratch directory before the
//! build; building against the copy is much faster than against a bind
//! mount on some hosts.

mod exclude;

pub use exclude::{ExcludeError, ExcludeRules};

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// File whose presence marks a usable firmware source tree
pub const SOURCE_MARKER: &str = "CMakeLists.txt";

/// Errors for source staging
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("firmware source not found in {0} (missing CMakeLists.txt)")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Exclude rules error: {0}")]
    ExcludeError(#[from] ExcludeError),

    #[error("Path is not within source root: {0}")]
    PathNotInSource(PathBuf),

    #[error("work directory {work} overlaps source directory {source_dir}")]
    Overlap { source_dir: PathBuf, work: PathBuf },
}

/// Summary of a completed copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: u64,
    pub directories: u64,
    pub bytes: u64,
    pub skipped: u64,
}

/// Fail unless `source_dir` looks like a firmware source tree.
pub fn check_source(source_dir: &Path) -> Result<(), SourceError> {
    if source_dir.join(SOURCE_MARKER).is_file() {
        Ok(())
    } else {
        Err(SourceError::NotFound(source_dir.to_path_buf()))
    }
}

/// True when `a` and `b` are the same directory or one contains the other.
///
/// Paths are made absolute against the current directory and compared
/// lexically; symlinks are not resolved.
pub fn paths_overlap(a: &Path, b: &Path) -> bool {
    let (a, b) = (absolute(a), absolute(b));
    a.starts_with(&b) || b.starts_with(&a)
}

fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Copy `source` to `dest`, skipping excluded paths.
///
/// An existing `dest` is removed first so stale files never leak into the
/// build. Symlinks are copied as the files they point to. `dest` must not
/// overlap `source`.
pub fn copy_tree(source: &Path, dest: &Path, exclude: &ExcludeRules) -> Result<CopyStats, SourceError> {
    if paths_overlap(source, dest) {
        return Err(SourceError::Overlap {
            source_dir: source.to_path_buf(),
            work: dest.to_path_buf(),
        });
    }
    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    fs::create_dir_all(dest)?;

    let mut stats = CopyStats::default();
    let mut walker = WalkDir::new(source)
        .follow_links(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let path = entry.path();
        let rel_path = path
            .strip_prefix(source)
            .map_err(|_| SourceError::PathNotInSource(path.to_path_buf()))?;

        if rel_path.as_os_str().is_empty() {
            continue;
        }

        if exclude.is_excluded(rel_path) {
            stats.skipped += 1;
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        let target = dest.join(rel_path);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            stats.directories += 1;
        } else {
            stats.bytes += fs::copy(path, &target)?;
            stats.files += 1;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_source_tree() -> TempDir {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join(SOURCE_MARKER), "project(opentx)").unwrap();
        fs::create_dir_all(dir.path().join("radio/src")).unwrap();
        fs::write(dir.path().join("radio/src/opentx.cpp"), "int main() {}").unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();

        dir
    }

    fn git_rules() -> ExcludeRules {
        ExcludeRules::new(&[".git"]).unwrap()
    }

    #[test]
    fn test_check_source() {
        let dir = create_source_tree();
        assert!(check_source(dir.path()).is_ok());

        let empty = TempDir::new().unwrap();
        assert!(matches!(check_source(empty.path()), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn test_copy_tree_skips_git() {
        let src = create_source_tree();
        let dest = TempDir::new().unwrap();
        let target = dest.path().join("work");

        let stats = copy_tree(src.path(), &target, &git_rules()).unwrap();

        assert!(target.join(SOURCE_MARKER).is_file());
        assert!(target.join("radio/src/opentx.cpp").is_file());
        assert!(!target.join(".git").exists());
        assert_eq!(stats.files, 2);
        assert_eq!(stats.directories, 2);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_copy_tree_replaces_stale_destination() {
        let src = create_source_tree();
        let dest = TempDir::new().unwrap();
        let target = dest.path().join("work");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("stale.o"), "old").unwrap();

        copy_tree(src.path(), &target, &git_rules()).unwrap();

        assert!(!target.join("stale.o").exists());
        assert!(target.join(SOURCE_MARKER).is_file());
    }

    #[test]
    fn test_paths_overlap() {
        assert!(paths_overlap(Path::new("/opentx"), Path::new("/opentx")));
        assert!(paths_overlap(Path::new("/opentx"), Path::new("/")));
        assert!(paths_overlap(Path::new("/tmp/opentx"), Path::new("/tmp")));
        assert!(paths_overlap(Path::new("/opentx"), Path::new("/opentx/work")));
        assert!(paths_overlap(Path::new("/opentx"), Path::new("/opentx/radio/../work")));
        assert!(!paths_overlap(Path::new("/opentx"), Path::new("/tmp/opentx")));
        assert!(!paths_overlap(Path::new("/opentx"), Path::new("/opentx2")));
    }

    #[test]
    fn test_copy_tree_refuses_parent_destination() {
        let root = TempDir::new().unwrap();
        let src = root.path().join("opentx");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join(SOURCE_MARKER), "project(opentx)").unwrap();

        let result = copy_tree(&src, root.path(), &git_rules());

        assert!(matches!(result, Err(SourceError::Overlap { .. })));
        assert!(src.join(SOURCE_MARKER).is_file());
    }

    #[test]
    fn test_copy_tree_refuses_nested_destination() {
        let src = create_source_tree();
        let nested = src.path().join("zwork");

        let result = copy_tree(src.path(), &nested, &git_rules());

        assert!(matches!(result, Err(SourceError::Overlap { .. })));
        assert!(!nested.exists());
    }
}
