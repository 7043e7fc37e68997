//! Path confinement: every file tool path must resolve inside the workspace root.
//!
//! Paths are resolved component by component so that symlinks and `..`
//! segments are followed physically, even when the tail of the path does not
//! exist yet (a write target). Containment is a component-wise
//! [`Path::starts_with`] on canonical paths, so `/workspace2` is never mistaken
//! for a child of `/workspace`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use workbench_core::error::FileAccessError;

/// Symlink hops followed before giving up (Linux uses the same limit).
const MAX_SYMLINK_HOPS: usize = 40;

/// The single directory all relative file operations are confined to.
///
/// Canonicalized once at construction and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRoot {
    path: PathBuf,
}

impl WorkspaceRoot {
    /// Canonicalize `path` and fix it as the workspace root.
    ///
    /// The directory must already exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, FileAccessError> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FileAccessError::NotFound {
                path: path.to_path_buf(),
            },
            _ => FileAccessError::io(path, e),
        })?;

        if !canonical.is_dir() {
            return Err(FileAccessError::io(
                path,
                io::Error::new(
                    io::ErrorKind::NotADirectory,
                    "workspace root must be a directory",
                ),
            ));
        }

        Ok(Self { path: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `candidate` (already canonical) is the root or lies beneath it.
    pub fn contains(&self, candidate: &Path) -> bool {
        candidate.starts_with(&self.path)
    }
}

impl fmt::Display for WorkspaceRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// An absolute path proven to lie inside the workspace root.
///
/// Only [`PathResolver::resolve`] can build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// The directory the file lives in. Always inside the root.
    pub fn parent(&self) -> &Path {
        self.0.parent().unwrap_or(&self.0)
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Turns caller-supplied paths into [`ResolvedPath`]s under one root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: WorkspaceRoot,
}

impl PathResolver {
    pub fn new(root: WorkspaceRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &WorkspaceRoot {
        &self.root
    }

    /// Resolve `path` against the workspace root.
    ///
    /// Relative paths are joined under the root; absolute paths are taken as
    /// given. The result is canonicalized and must stay inside the root and
    /// must not name a directory. With `ensure_parent`, missing ancestor
    /// directories are created.
    pub fn resolve(&self, path: &str, ensure_parent: bool) -> Result<ResolvedPath, FileAccessError> {
        let candidate = Path::new(path);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.path().join(candidate)
        };

        let mut hops = 0;
        let resolved =
            resolve_components(&joined, &mut hops).map_err(|e| FileAccessError::io(&joined, e))?;

        if !self.root.contains(&resolved) {
            warn!(path = %path, resolved = %resolved.display(), root = %self.root, "Path escape blocked");
            return Err(FileAccessError::PathEscape {
                path: path.into(),
                root: self.root.path().to_path_buf(),
            });
        }

        if resolved.is_dir() {
            return Err(FileAccessError::InvalidTarget { path: path.into() });
        }

        if ensure_parent
            && let Some(parent) = resolved.parent()
        {
            fs::create_dir_all(parent).map_err(|e| FileAccessError::io(parent, e))?;
        }

        debug!(path = %path, resolved = %resolved.display(), "Resolved workspace path");
        Ok(ResolvedPath(resolved))
    }
}

/// Canonicalize an absolute path whose tail may not exist.
///
/// The existing prefix is resolved physically (symlinks followed, `..` popped
/// from an already-canonical prefix). Components below a missing one are
/// applied lexically until a `..` climbs back into an existing directory,
/// where symlink checks resume.
fn resolve_components(path: &Path, hops: &mut usize) -> io::Result<PathBuf> {
    let mut resolved = PathBuf::new();
    let mut exists = true;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
                exists = fs::symlink_metadata(&resolved).is_ok();
            }
            Component::Normal(name) => {
                let next = resolved.join(name);
                if !exists {
                    resolved = next;
                    continue;
                }

                match fs::symlink_metadata(&next) {
                    Ok(meta) if meta.file_type().is_symlink() => {
                        *hops += 1;
                        if *hops > MAX_SYMLINK_HOPS {
                            return Err(io::Error::other(format!(
                                "too many levels of symbolic links at {}",
                                next.display()
                            )));
                        }
                        let target = fs::read_link(&next)?;
                        let target = if target.is_absolute() {
                            target
                        } else {
                            resolved.join(target)
                        };
                        resolved = resolve_components(&target, hops)?;
                        exists = fs::symlink_metadata(&resolved).is_ok();
                    }
                    Ok(_) => resolved = next,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        exists = false;
                        resolved = next;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    Ok(resolved)
}
