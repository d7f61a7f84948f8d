//! Output root and path-safety validation for unpacked documents.

use crate::error::{Error, Result, Violation};
use std::path::{Component, Path, PathBuf};

/// The directory every unpacked document must land under.
///
/// Constructed from an existing directory and stored as a canonical absolute
/// path, so that lexical containment checks against it are meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRoot(PathBuf);

impl OutputRoot {
    /// Use `path` as the output root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the path does not exist, is not a directory, or
    /// cannot be canonicalized.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|e| Error::io(path, e))?;

        if !canonical.is_dir() {
            return Err(Error::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "output root is not a directory",
                ),
            ));
        }

        Ok(Self(canonical))
    }

    /// Use the process working directory as the output root.
    pub fn current_dir() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        Self::new(cwd)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Resolve a raw document path against this root.
    ///
    /// `index` is the document position, carried into the error on refusal.
    pub fn resolve(&self, candidate: &str, index: usize) -> Result<SafePath> {
        SafePath::resolve(candidate, self).map_err(|violation| Error::PathUnsafe {
            index,
            path: candidate.to_string(),
            violation,
        })
    }
}

/// An absolute path that has been checked to lie inside an [`OutputRoot`].
///
/// Can only be obtained through [`SafePath::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Normalize `candidate` lexically and check it against `root`.
    ///
    /// Both `/` and `\` separate segments. Relative candidates are joined onto
    /// the root; absolute ones are taken as they are. Symlinks are not
    /// followed.
    ///
    /// ```
    /// use doctar::{OutputRoot, SafePath};
    ///
    /// let root = OutputRoot::new(std::env::temp_dir()).unwrap();
    /// assert!(SafePath::resolve("sub/../a.txt", &root).is_ok());
    /// assert!(SafePath::resolve("../a.txt", &root).is_err());
    /// ```
    pub fn resolve(candidate: &str, root: &OutputRoot) -> std::result::Result<Self, Violation> {
        if candidate.contains('\0') {
            return Err(Violation::NulByte);
        }

        let unified = candidate.replace('\\', "/");
        let path = Path::new(&unified);

        let mut resolved = if path.has_root() {
            PathBuf::new()
        } else {
            root.as_path().to_path_buf()
        };

        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => resolved.push(component),
                Component::CurDir => {}
                Component::ParentDir => {
                    // Popping the filesystem root is a no-op, like `/..` == `/`.
                    resolved.pop();
                }
                Component::Normal(segment) => resolved.push(segment),
            }
        }

        if resolved.starts_with(root.as_path()) {
            Ok(Self(resolved))
        } else {
            Err(Violation::EscapesRoot {
                resolved,
                root: root.as_path().to_path_buf(),
            })
        }
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Whether the path is the output root itself
    pub fn is_root(&self, root: &OutputRoot) -> bool {
        self.0 == root.0
    }
}

impl AsRef<Path> for SafePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_root() -> (TempDir, OutputRoot) {
        let temp = TempDir::new().unwrap();
        let root = OutputRoot::new(temp.path()).unwrap();
        (temp, root)
    }

    #[test]
    fn test_output_root_is_canonical() {
        let (temp, root) = test_root();
        assert_eq!(root.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_output_root_current_dir() {
        let root = OutputRoot::current_dir().unwrap();
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        assert_eq!(root.as_path(), cwd);
    }

    #[test]
    fn test_output_root_missing_directory() {
        let temp = TempDir::new().unwrap();
        let err = OutputRoot::new(temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_output_root_rejects_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(OutputRoot::new(&file).is_err());
    }

    #[test]
    fn test_relative_subpath_accepted() {
        let (_temp, root) = test_root();
        let safe = SafePath::resolve("sub/dir/b.txt", &root).unwrap();
        assert_eq!(safe.as_path(), root.as_path().join("sub/dir/b.txt"));
    }

    #[test]
    fn test_dot_segments_normalized() {
        let (_temp, root) = test_root();
        let safe = SafePath::resolve("./a//./b/../c.txt", &root).unwrap();
        assert_eq!(safe.as_path(), root.as_path().join("a/c.txt"));
    }

    #[test]
    fn test_parent_escape_rejected() {
        let (_temp, root) = test_root();
        let err = SafePath::resolve("../evil.txt", &root).unwrap_err();
        assert!(matches!(err, Violation::EscapesRoot { .. }));
    }

    #[test]
    fn test_deep_parent_escape_rejected() {
        let (_temp, root) = test_root();
        assert!(SafePath::resolve("a/b/../../../etc/passwd", &root).is_err());
        assert!(SafePath::resolve("../../../../../../../../etc/passwd", &root).is_err());
    }

    #[test]
    fn test_backslash_traversal_rejected() {
        let (_temp, root) = test_root();
        assert!(SafePath::resolve("..\\evil.txt", &root).is_err());
        assert!(SafePath::resolve("sub\\..\\..\\evil.txt", &root).is_err());
    }

    #[test]
    fn test_backslash_subpath_accepted() {
        let (_temp, root) = test_root();
        let safe = SafePath::resolve("sub\\b.txt", &root).unwrap();
        assert_eq!(safe.as_path(), root.as_path().join("sub").join("b.txt"));
    }

    #[test]
    fn test_absolute_outside_rejected() {
        let (_temp, root) = test_root();
        assert!(SafePath::resolve("/etc/passwd", &root).is_err());
    }

    #[test]
    fn test_absolute_inside_accepted() {
        let (_temp, root) = test_root();
        let inside = root.as_path().join("x/y.txt");
        let safe = SafePath::resolve(inside.to_str().unwrap(), &root).unwrap();
        assert_eq!(safe.as_path(), inside);
    }

    #[test]
    fn test_sibling_with_common_prefix_rejected() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("out")).unwrap();
        let root = OutputRoot::new(temp.path().join("out")).unwrap();
        // "out-evil" shares a string prefix with "out" but not a segment.
        assert!(SafePath::resolve("../out-evil/a.txt", &root).is_err());
    }

    #[test]
    fn test_root_itself_is_contained() {
        let (_temp, root) = test_root();
        let safe = SafePath::resolve("sub/..", &root).unwrap();
        assert!(safe.is_root(&root));
        assert!(SafePath::resolve("", &root).unwrap().is_root(&root));
    }

    #[test]
    fn test_nul_byte_rejected() {
        let (_temp, root) = test_root();
        assert_eq!(SafePath::resolve("a\0.txt", &root), Err(Violation::NulByte));
    }

    #[test]
    fn test_resolve_reports_index_and_path() {
        let (_temp, root) = test_root();
        match root.resolve("../x", 4).unwrap_err() {
            Error::PathUnsafe { index, path, .. } => {
                assert_eq!(index, 4);
                assert_eq!(path, "../x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
