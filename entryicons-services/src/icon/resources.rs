//! Bundled icon and badge resources.
//!
//! Icons and badges live in two flat namespaces. A [`ResourceProvider`] only
//! has to list a namespace (name-sorted) and hand out the bytes of one file;
//! decoding happens in the loader.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use xdg::BaseDirectories;

use crate::icon::error::IconError;

/// One of the two resource directories the icon service reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceNamespace {
    /// Base icons for database entries.
    Icons,
    /// Overlay badges.
    Badges,
}

impl ResourceNamespace {
    /// Directory name of the namespace below a resource root.
    pub fn dir_name(self) -> &'static str {
        match self {
            ResourceNamespace::Icons => "database",
            ResourceNamespace::Badges => "badges",
        }
    }
}

/// Source of icon and badge files.
pub trait ResourceProvider: Send + Sync {
    /// List the file names of a namespace, sorted by name.
    fn list(&self, namespace: ResourceNamespace) -> Result<Vec<String>, IconError>;

    /// Read the raw bytes of one file.
    fn read(&self, namespace: ResourceNamespace, name: &str) -> Result<Vec<u8>, IconError>;
}

/// Resources read from a directory tree (`<root>/database`, `<root>/badges`).
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    /// Create a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the resource root in the XDG data directories.
    ///
    /// Looks for `<data dir>/<app_name>/icons`, user data home first, then
    /// `XDG_DATA_DIRS` in order.
    pub fn discover(app_name: &str) -> Option<Self> {
        let xdg_dirs = match BaseDirectories::with_prefix(app_name) {
            Ok(dirs) => dirs,
            Err(e) => {
                log::warn!("Failed to resolve XDG directories for {}: {}", app_name, e);
                return None;
            },
        };

        let root = xdg_dirs.find_data_file("icons")?;
        log::info!("Using icon resources from {:?}", root);
        Some(Self::new(root))
    }

    /// The resource root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: ResourceNamespace) -> PathBuf {
        self.root.join(namespace.dir_name())
    }
}

impl ResourceProvider for DirectoryResources {
    fn list(&self, namespace: ResourceNamespace) -> Result<Vec<String>, IconError> {
        let dir = self.namespace_dir(namespace);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("Resource directory {:?} does not exist", dir);
                return Ok(Vec::new());
            },
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            } else {
                log::warn!("Skipping non UTF-8 resource name {:?}", entry.file_name());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, namespace: ResourceNamespace, name: &str) -> Result<Vec<u8>, IconError> {
        if name.is_empty() || name.contains(&['/', '\\'][..]) || name == ".." {
            return Err(IconError::ResourceNotFound(name.to_string()));
        }

        let path = self.namespace_dir(namespace).join(name);
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                IconError::ResourceNotFound(format!("{}/{}", namespace.dir_name(), name))
            },
            _ => IconError::IoError(e),
        })
    }
}

/// In-memory resources, for assets compiled in with `include_bytes!`.
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
    files: BTreeMap<ResourceNamespace, BTreeMap<String, Vec<u8>>>,
}

impl MemoryResources {
    /// Create an empty resource set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(
        &mut self,
        namespace: ResourceNamespace,
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) {
        self.files
            .entry(namespace)
            .or_default()
            .insert(name.into(), bytes.into());
    }

    /// Builder form of [`MemoryResources::insert`].
    pub fn with(
        mut self,
        namespace: ResourceNamespace,
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(namespace, name, bytes);
        self
    }
}

impl ResourceProvider for MemoryResources {
    fn list(&self, namespace: ResourceNamespace) -> Result<Vec<String>, IconError> {
        // BTreeMap keys are already name-sorted.
        Ok(self
            .files
            .get(&namespace)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn read(&self, namespace: ResourceNamespace, name: &str) -> Result<Vec<u8>, IconError> {
        self.files
            .get(&namespace)
            .and_then(|files| files.get(name))
            .cloned()
            .ok_or_else(|| {
                IconError::ResourceNotFound(format!("{}/{}", namespace.dir_name(), name))
            })
    }
}
