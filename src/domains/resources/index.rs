//! Resource index - discovery of markdown documents under the content root.
//!
//! Every immediate subdirectory of the content root is a category, and every
//! `*.md` file inside a category becomes one resource addressed as
//! `<uri_prefix>/<category>/<relative path>`. The index is built once and is
//! never mutated afterwards.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use super::error::ResourceError;
use crate::core::config::{ResourcesConfig, SecurityConfig};
use crate::core::security::validate_path;

/// Suffix a file name must end with to be indexed (case-sensitive).
const MARKDOWN_EXTENSION: &str = ".md";

/// MIME type reported for every indexed resource.
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";

/// One indexed markdown document.
///
/// Only `uri`, `name`, `description` and `mimeType` are serialized; the
/// category and backing path stay on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
    #[serde(skip)]
    pub category: String,
    #[serde(skip)]
    pub file_path: PathBuf,
}

impl ResourceEntry {
    /// Build the entry for `relative_path` inside `category`.
    ///
    /// `relative_path` uses `/` separators and is usually a bare file name.
    pub fn new(uri_prefix: &str, category: &str, relative_path: &str, file_path: PathBuf) -> Self {
        let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        let name = file_name
            .strip_suffix(MARKDOWN_EXTENSION)
            .unwrap_or(file_name)
            .to_string();

        Self {
            uri: resource_uri(uri_prefix, category, relative_path),
            name,
            description: format!("{category} - {relative_path}"),
            mime_type: MARKDOWN_MIME_TYPE.to_string(),
            category: category.to_string(),
            file_path,
        }
    }
}

/// Build the URI of a document from its category and relative path.
fn resource_uri(uri_prefix: &str, category: &str, relative_path: &str) -> String {
    format!("{uri_prefix}/{category}/{relative_path}")
}

/// Immutable mapping from URI to indexed document.
///
/// Entries are kept sorted by URI so listings are stable across calls and
/// across runs.
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    root: PathBuf,
    allow_symlinks: bool,
    entries: BTreeMap<String, ResourceEntry>,
}

impl ResourceIndex {
    /// Scan the content root, falling back to an empty index when the root
    /// cannot be read.
    pub fn build(config: &ResourcesConfig, security: &SecurityConfig) -> Self {
        match Self::scan(config, security) {
            Ok(index) => index,
            Err(e) => {
                warn!("Starting with an empty resource index: {}", e);
                Self {
                    root: config.content_root.clone(),
                    allow_symlinks: security.allow_symlinks,
                    entries: BTreeMap::new(),
                }
            }
        }
    }

    /// Scan the content root.
    ///
    /// Fails only when the root itself cannot be opened. Unreadable
    /// categories and individual files are skipped with a warning.
    #[instrument(skip_all, fields(root = %config.content_root.display()))]
    pub fn scan(config: &ResourcesConfig, security: &SecurityConfig) -> Result<Self, ResourceError> {
        let root = config
            .content_root
            .canonicalize()
            .map_err(|e| ResourceError::root_unavailable(&config.content_root, e))?;
        std::fs::read_dir(&root).map_err(|e| ResourceError::root_unavailable(&root, e))?;

        let mut index = Self {
            root,
            allow_symlinks: security.allow_symlinks,
            entries: BTreeMap::new(),
        };

        let categories = WalkDir::new(&index.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in categories {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in content root: {}", e);
                    continue;
                }
            };

            if !index.is_category(&entry) {
                debug!("Ignoring non-directory {:?} in content root", entry.path());
                continue;
            }

            let Some(category) = entry.file_name().to_str() else {
                warn!("Skipping category with non UTF-8 name: {:?}", entry.path());
                continue;
            };

            index.scan_category(category, entry.path(), config);
        }

        info!(
            "Indexed {} resources from {:?}",
            index.entries.len(),
            index.root
        );
        Ok(index)
    }

    /// Whether a top-level entry is a usable category directory.
    fn is_category(&self, entry: &DirEntry) -> bool {
        if !entry.path_is_symlink() {
            return entry.file_type().is_dir();
        }

        match validate_path(entry.path(), &self.root, self.allow_symlinks) {
            Ok(target) => target.is_dir(),
            Err(e) => {
                warn!("Skipping category {:?}: {}", entry.path(), e);
                false
            }
        }
    }

    fn scan_category(&mut self, category: &str, category_path: &Path, config: &ResourcesConfig) {
        let max_depth = if config.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(category_path)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(self.allow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in category {}: {}", category, e);
                    continue;
                }
            };

            let is_markdown = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(MARKDOWN_EXTENSION));
            if !is_markdown || entry.file_type().is_dir() {
                continue;
            }

            let Some(relative_path) = relative_uri_path(entry.path(), category_path) else {
                warn!("Skipping file with non UTF-8 path: {:?}", entry.path());
                continue;
            };

            match validate_path(entry.path(), &self.root, self.allow_symlinks) {
                Ok(target) if target.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("Skipping {:?}: {}", entry.path(), e);
                    continue;
                }
            }

            let resource = ResourceEntry::new(
                &config.uri_prefix,
                category,
                &relative_path,
                entry.path().to_path_buf(),
            );
            debug!("Indexed resource: {}", resource.uri);
            self.entries.insert(resource.uri.clone(), resource);
        }
    }

    /// The content root the index was built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether symlinks inside the root are followed.
    pub fn allow_symlinks(&self) -> bool {
        self.allow_symlinks
    }

    /// Look up a document by URI.
    pub fn get(&self, uri: &str) -> Option<&ResourceEntry> {
        self.entries.get(uri)
    }

    /// Iterate over all documents in URI order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Join the components of `path` below `base` with `/`.
fn relative_uri_path(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
