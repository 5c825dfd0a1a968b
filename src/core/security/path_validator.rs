use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during path validation
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("Path '{path}' is outside allowed root directory '{root}'")]
    OutsideRootDirectory { path: PathBuf, root: PathBuf },

    #[error("Symlink '{path}' points outside allowed root directory")]
    SymlinkOutsideRoot { path: PathBuf },

    #[error("Symlink '{path}' rejected: symlinks are disabled")]
    SymlinkNotAllowed { path: PathBuf },

    #[error("{error}")]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}

impl PathSecurityError {
    /// Whether the failure came from the filesystem rather than from policy.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Validates that `input_path` resolves to a location inside `root`.
///
/// This function performs the following checks:
/// 1. Rejects symlinks outright when `allow_symlinks` is false
/// 2. Canonicalizes the input path to resolve `.`, `..`, and symlinks
/// 3. Ensures the canonical path is within the canonical root
///
/// # Returns
///
/// * `Ok(PathBuf)` - The canonicalized, validated path
/// * `Err(PathSecurityError)` - If validation fails
///
/// # Examples
///
/// ```rust,ignore
/// let safe = validate_path(&root.join("00_CORE/INDEX.md"), &root, true)?;
/// ```
pub fn validate_path(
    input_path: &Path,
    root: &Path,
    allow_symlinks: bool,
) -> Result<PathBuf, PathSecurityError> {
    let canonical_root = root.canonicalize().map_err(|error| PathSecurityError::Io {
        path: root.to_path_buf(),
        error,
    })?;

    let metadata = input_path
        .symlink_metadata()
        .map_err(|error| PathSecurityError::Io {
            path: input_path.to_path_buf(),
            error,
        })?;
    let is_symlink = metadata.file_type().is_symlink();

    if is_symlink && !allow_symlinks {
        return Err(PathSecurityError::SymlinkNotAllowed {
            path: input_path.to_path_buf(),
        });
    }

    let canonical_path = input_path
        .canonicalize()
        .map_err(|error| PathSecurityError::Io {
            path: input_path.to_path_buf(),
            error,
        })?;

    if !is_within_root(&canonical_path, &canonical_root) {
        if is_symlink {
            return Err(PathSecurityError::SymlinkOutsideRoot {
                path: input_path.to_path_buf(),
            });
        }
        return Err(PathSecurityError::OutsideRootDirectory {
            path: canonical_path,
            root: canonical_root,
        });
    }

    Ok(canonical_path)
}

/// Checks if a path is within (or equal to) a root directory
fn is_within_root(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}
