//! Read-only catalogs of header and footer resources.
//!
//! A store only indexes where resources live. Every `open` hands out a new,
//! independent stream, so concurrent readers never share position state.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::identifier::ResourceIdentifier;

/// Readable stream over a single resource.
pub type ResourceStream = Box<dyn AsyncRead + Send + Unpin>;

/// Named-resource lookup over packaged content.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Open a fresh stream for `id`, or `ResourceNotFound`.
    async fn open(&self, id: &ResourceIdentifier) -> TemplateResult<ResourceStream>;

    /// Whether the index knows about `id`.
    fn contains(&self, id: &ResourceIdentifier) -> bool;
}

/// Resources held in memory, typically from `include_str!`.
#[derive(Default, Clone)]
pub struct EmbeddedResourceStore {
    resources: HashMap<String, Arc<[u8]>>,
}

impl EmbeddedResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, name: impl Into<String>, content: impl AsRef<[u8]>) -> Self {
        self.insert(name, content);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl AsRef<[u8]>) {
        let name = name.into();
        debug!("Embedding resource: {}", name);
        self.resources.insert(name, Arc::from(content.as_ref()));
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[async_trait]
impl ResourceStore for EmbeddedResourceStore {
    async fn open(&self, id: &ResourceIdentifier) -> TemplateResult<ResourceStream> {
        let content = self
            .resources
            .get(id.as_str())
            .ok_or_else(|| TemplateError::ResourceNotFound(id.to_string()))?;
        Ok(Box::new(Cursor::new(Arc::clone(content))))
    }

    fn contains(&self, id: &ResourceIdentifier) -> bool {
        self.resources.contains_key(id.as_str())
    }
}

impl std::fmt::Debug for EmbeddedResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedResourceStore")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Resources read from files on disk, indexed once by name.
#[derive(Debug, Default, Clone)]
pub struct DirectoryResourceStore {
    root: PathBuf,
    index: HashMap<String, PathBuf>,
}

impl DirectoryResourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: HashMap::new(),
        }
    }

    /// Index the file at `path` (relative to the root) under `name`.
    ///
    /// A name already indexed for another file is rejected, never replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> TemplateResult<()> {
        let name = name.into();
        let path = path.into();
        if let Some(existing) = self.index.get(&name) {
            return Err(TemplateError::DuplicateResource {
                first: existing.display().to_string(),
                second: path.display().to_string(),
                name,
            });
        }
        debug!("Indexing resource {} -> {:?}", name, path);
        self.index.insert(name, path);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[async_trait]
impl ResourceStore for DirectoryResourceStore {
    async fn open(&self, id: &ResourceIdentifier) -> TemplateResult<ResourceStream> {
        let relative = self
            .index
            .get(id.as_str())
            .ok_or_else(|| TemplateError::ResourceNotFound(id.to_string()))?;
        let path = self.root.join(relative);

        match tokio::fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(file)),
            // Deleted after indexing.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::ResourceNotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, id: &ResourceIdentifier) -> bool {
        self.index.contains_key(id.as_str())
    }
}
