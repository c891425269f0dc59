//! Header, body and footer composition.
//!
//! A `compose` call runs strictly in order: resolve the template set, stream
//! the header, render the body, stream the footer. Any failure discards what
//! was buffered so far; callers get the whole document or an error.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::config::DEFAULT_CHUNK_SIZE;
use crate::error::{TemplateError, TemplateResult};
use crate::identifier::ResourceIdentifier;
use crate::registry::TemplateRegistry;
use crate::renderer::TemplateExecutor;
use crate::resolver::{ResolutionReport, TemplateResolver};
use crate::store::{ResourceStream, ResourceStore};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A value that can be rendered by the template set carrying its name.
pub trait TemplateModel: Serialize + Send + Sync {
    /// Name of the template set, e.g. `Invoice` for `/Templates/Invoice.hbs`.
    fn template_name(&self) -> &str;
}

/// Composes documents from template sets.
///
/// Cheap to clone; the store, registry and executor are shared read-only.
#[derive(Clone)]
pub struct Compositor {
    resolver: TemplateResolver,
    store: Arc<dyn ResourceStore>,
    registry: Arc<TemplateRegistry>,
    executor: Arc<dyn TemplateExecutor>,
    chunk_size: usize,
}

impl Compositor {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        registry: Arc<TemplateRegistry>,
        executor: Arc<dyn TemplateExecutor>,
    ) -> Self {
        Self {
            resolver: TemplateResolver::new(Arc::clone(&store), Arc::clone(&registry)),
            store,
            registry,
            executor,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Compose the document for `model` using the template set it names.
    pub async fn compose<M: TemplateModel>(&self, model: &M) -> TemplateResult<String> {
        let value = serde_json::to_value(model)?;
        self.compose_value(model.template_name(), value).await
    }

    /// Compose with an explicit template set name and a JSON model.
    pub async fn compose_value(&self, model_name: &str, model: Value) -> TemplateResult<String> {
        if model.is_null() {
            return Err(TemplateError::InvalidModel(format!(
                "model for '{model_name}' is null"
            )));
        }

        let set = self.resolver.resolve(model_name).await?;

        let mut output = String::new();
        self.stream_resource(&set.header, &mut output).await?;

        let artifact = self.registry.lookup(&set.body)?;
        let mut body = String::new();
        self.executor.execute(artifact, &model, &mut body).await?;
        output.push_str(&body);

        self.stream_resource(&set.footer, &mut output).await?;

        debug!("Composed '{}' ({} bytes)", model_name, output.len());
        Ok(output)
    }

    /// Run resolution only and report every member's status.
    pub async fn validate(&self, model_name: &str) -> TemplateResult<ResolutionReport> {
        self.resolver.report(model_name).await
    }

    async fn stream_resource(&self, id: &ResourceIdentifier, out: &mut String) -> TemplateResult<()> {
        let stream = self.store.open(id).await?;
        copy_resource(stream, out, self.chunk_size, id).await
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("registry", &self.registry)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

/// Copy a resource into `out` in blocks of `chunk_size` bytes.
async fn copy_resource(
    mut stream: ResourceStream,
    out: &mut String,
    chunk_size: usize,
    id: &ResourceIdentifier,
) -> TemplateResult<()> {
    let mut buffer = vec![0u8; chunk_size];
    let mut decoder = ChunkDecoder::default();

    loop {
        let read = stream.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        if !decoder.feed(&buffer[..read], out) {
            return Err(TemplateError::InvalidEncoding(id.to_string()));
        }
    }

    if !decoder.finish(out) {
        return Err(TemplateError::InvalidEncoding(id.to_string()));
    }
    Ok(())
}

/// Incremental UTF-8 decoding across block boundaries.
///
/// A leading byte-order mark is dropped.
#[derive(Debug)]
struct ChunkDecoder {
    pending: Vec<u8>,
    at_start: bool,
}

impl Default for ChunkDecoder {
    fn default() -> Self {
        Self {
            pending: Vec::with_capacity(4),
            at_start: true,
        }
    }
}

impl ChunkDecoder {
    fn feed(&mut self, bytes: &[u8], out: &mut String) -> bool {
        self.pending.extend_from_slice(bytes);

        if self.at_start {
            if self.pending.len() < UTF8_BOM.len() && UTF8_BOM.starts_with(&self.pending) {
                return true;
            }
            if self.pending.starts_with(UTF8_BOM) {
                self.pending.drain(..UTF8_BOM.len());
            }
            self.at_start = false;
        }

        self.flush(out, false)
    }

    fn finish(mut self, out: &mut String) -> bool {
        self.flush(out, true)
    }

    fn flush(&mut self, out: &mut String, eof: bool) -> bool {
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                out.push_str(text);
                self.pending.clear();
                true
            }
            // Sequence cut off by the block boundary; keep the tail for the next block.
            Err(e) if e.error_len().is_none() && !eof => {
                let valid = e.valid_up_to();
                match std::str::from_utf8(&self.pending[..valid]) {
                    Ok(text) => out.push_str(text),
                    Err(_) => return false,
                }
                self.pending.drain(..valid);
                true
            }
            Err(_) => false,
        }
    }
}
