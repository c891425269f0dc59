//! Template package loading.
//!
//! A package is a directory laid out like the catalog it produces:
//!
//! ```text
//! site/
//! ├── package.yaml            (optional)
//! └── Templates/
//!     ├── Invoice.hbs         -> template  /Templates/Invoice.hbs
//!     ├── InvoiceHeader.html  -> resource  Templates.InvoiceHeader.html
//!     └── InvoiceFooter.html  -> resource  Templates.InvoiceFooter.html
//! ```
//!
//! Templates are compiled while loading, so a broken template stops startup
//! instead of failing the first render.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::compositor::Compositor;
use crate::config::ComposerConfig;
use crate::error::{TemplateError, TemplateResult};
use crate::identifier::{TEMPLATE_EXTENSION, TEMPLATE_FOLDER};
use crate::registry::{TemplateArtifact, TemplateRegistry};
use crate::renderer::HandlebarsExecutor;
use crate::store::DirectoryResourceStore;

/// Manifest file names, in lookup order.
pub const MANIFEST_FILES: [&str; 2] = ["package.yaml", "package.yml"];

/// Optional package manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Templates whose identity is declared rather than derived from their path
    #[serde(default)]
    pub templates: Vec<DeclaredTemplate>,
}

/// A template declaring its own logical identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredTemplate {
    /// Identifier the template registers under, e.g. `/Templates/Invoice.hbs`
    pub id: String,
    /// Source file, relative to the package root
    pub path: PathBuf,
}

/// A loaded package: resource index plus compiled templates.
#[derive(Debug)]
pub struct TemplatePackage {
    store: DirectoryResourceStore,
    registry: TemplateRegistry,
}

impl TemplatePackage {
    /// Load every template and resource below `root`.
    pub fn load(root: impl Into<PathBuf>) -> TemplateResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(TemplateError::InvalidPackage(format!(
                "package directory does not exist: {}",
                root.display()
            )));
        }

        let (manifest_path, manifest) = Self::load_manifest(&root)?;
        let declared: HashSet<PathBuf> = manifest
            .templates
            .iter()
            .map(|t| t.path.clone())
            .collect();

        let mut store = DirectoryResourceStore::new(&root);
        let mut builder = TemplateRegistry::builder();

        for entry in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&root)
                .map_err(|e| TemplateError::InvalidPackage(e.to_string()))?
                .to_path_buf();

            if manifest_path.as_deref() == Some(relative.as_path()) || declared.contains(&relative) {
                continue;
            }

            if is_template(&relative) {
                let id = format!("/{}", join_components(&relative, "/"));
                let source = fs::read_to_string(entry.path())?;
                builder.add(TemplateArtifact::compile(id, &source)?)?;
            } else {
                store.register(join_components(&relative, "."), relative)?;
            }
        }

        for template in &manifest.templates {
            debug!("Loading declared template {} from {:?}", template.id, template.path);
            let source = fs::read_to_string(root.join(&template.path))?;
            builder.add(TemplateArtifact::compile(template.id.as_str(), &source)?)?;
        }

        let registry = builder.build();
        info!(
            "Loaded template package {:?}: {} templates, {} resources",
            root,
            registry.len(),
            store.len()
        );

        Ok(Self {
            store,
            registry,
        })
    }

    fn load_manifest(root: &Path) -> TemplateResult<(Option<PathBuf>, PackageManifest)> {
        for name in MANIFEST_FILES {
            let path = root.join(name);
            if path.is_file() {
                debug!("Loading package manifest from {:?}", path);
                let content = fs::read_to_string(&path)?;
                let manifest: PackageManifest = serde_yaml::from_str(&content)?;
                return Ok((Some(PathBuf::from(name)), manifest));
            }
        }
        Ok((None, PackageManifest::default()))
    }

    pub fn store(&self) -> &DirectoryResourceStore {
        &self.store
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Names of every model with a body template in the template folder.
    pub fn model_names(&self) -> Vec<String> {
        let prefix = format!("/{TEMPLATE_FOLDER}/");
        let suffix = format!(".{TEMPLATE_EXTENSION}");
        self.registry
            .ids()
            .into_iter()
            .filter_map(|id| {
                id.as_str()
                    .strip_prefix(&prefix)
                    .and_then(|rest| rest.strip_suffix(&suffix))
                    .filter(|name| !name.contains('/'))
                    .map(String::from)
            })
            .collect()
    }

    /// Wire a compositor over this package with the Handlebars executor.
    pub fn into_compositor(self, config: &ComposerConfig) -> Compositor {
        let executor = HandlebarsExecutor::new().strict(config.strict_models);
        Compositor::new(
            Arc::new(self.store),
            Arc::new(self.registry),
            Arc::new(executor),
        )
        .with_chunk_size(config.chunk_size)
    }

    /// Load the package named by `config` and wire a compositor over it.
    pub fn open(config: &ComposerConfig) -> TemplateResult<Compositor> {
        config.validate()?;
        Ok(Self::load(&config.package_root)?.into_compositor(config))
    }
}

fn is_template(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION)
}

fn join_components(path: &Path, separator: &str) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::ResourceIdentifier;
    use crate::store::ResourceStore;
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_missing_directory() {
        let temp = tempdir().unwrap();
        let err = TemplatePackage::load(temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidPackage(_)));
    }

    #[test]
    fn test_load_indexes_templates_and_resources() {
        let temp = tempdir().unwrap();
        write(temp.path(), "Templates/Invoice.hbs", "Total: {{total}}");
        write(temp.path(), "Templates/InvoiceHeader.html", "<h1>INV</h1>");
        write(temp.path(), "Templates/InvoiceFooter.html", "<hr/>");

        let package = TemplatePackage::load(temp.path()).unwrap();

        assert!(package
            .registry()
            .contains(&ResourceIdentifier::new("/Templates/Invoice.hbs")));
        assert!(package
            .store()
            .contains(&ResourceIdentifier::new("Templates.InvoiceHeader.html")));
        assert!(package
            .store()
            .contains(&ResourceIdentifier::new("Templates.InvoiceFooter.html")));
        assert_eq!(package.model_names(), vec!["Invoice".to_string()]);
    }

    #[test]
    fn test_declared_template_uses_its_own_identifier() {
        let temp = tempdir().unwrap();
        write(temp.path(), "sources/receipt_v2.hbs", "Paid {{amount}}");
        write(
            temp.path(),
            "package.yaml",
            "templates:\n  - id: /Templates/Receipt.hbs\n    path: sources/receipt_v2.hbs\n",
        );

        let package = TemplatePackage::load(temp.path()).unwrap();
        let ids: Vec<_> = package.registry().ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["/Templates/Receipt.hbs"]);
        assert!(!package
            .store()
            .contains(&ResourceIdentifier::new("package.yaml")));
    }

    #[test]
    fn test_declared_duplicate_is_fatal() {
        let temp = tempdir().unwrap();
        write(temp.path(), "Templates/Invoice.hbs", "one");
        write(temp.path(), "other/invoice.hbs", "two");
        write(
            temp.path(),
            "package.yaml",
            "templates:\n  - id: /Templates/Invoice.hbs\n    path: other/invoice.hbs\n",
        );

        let err = TemplatePackage::load(temp.path()).unwrap_err();
        assert!(matches!(err, TemplateError::DuplicateTemplate(id) if id == "/Templates/Invoice.hbs"));
    }

    #[test]
    fn test_compile_error_is_fatal() {
        let temp = tempdir().unwrap();
        write(temp.path(), "Templates/Broken.hbs", "{{#each items}}never closed");

        let err = TemplatePackage::load(temp.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Compile { template, .. } if template == "/Templates/Broken.hbs"));
    }

    #[test]
    fn test_dotted_root_file_cannot_shadow_folder_resource() {
        let temp = tempdir().unwrap();
        write(temp.path(), "Templates/Invoice.hbs", "Total: {{total}}");
        write(temp.path(), "Templates/InvoiceHeader.html", "<h1>INV</h1>");
        write(temp.path(), "Templates/InvoiceFooter.html", "<hr/>");
        write(temp.path(), "Templates.InvoiceHeader.html", "<h1>SHADOW</h1>");

        let err = TemplatePackage::load(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::DuplicateResource { ref name, .. } if name == "Templates.InvoiceHeader.html"
        ));
        assert!(err.to_string().contains("Templates.InvoiceHeader.html"));
    }

    #[test]
    fn test_nested_directories_cannot_shadow_folder_resource() {
        let temp = tempdir().unwrap();
        write(temp.path(), "Templates/InvoiceHeader.html", "<h1>INV</h1>");
        write(temp.path(), "Templates/InvoiceHeader/html", "<h1>SHADOW</h1>");

        let err = TemplatePackage::load(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::DuplicateResource { name, .. } if name == "Templates.InvoiceHeader.html"
        ));
    }

    #[tokio::test]
    async fn test_store_opens_indexed_file() {
        use tokio::io::AsyncReadExt;

        let temp = tempdir().unwrap();
        write(temp.path(), "Templates/NoteHeader.html", "<b>note</b>");

        let package = TemplatePackage::load(temp.path()).unwrap();
        let mut stream = package
            .store()
            .open(&ResourceIdentifier::new("Templates.NoteHeader.html"))
            .await
            .ok()
            .unwrap();
        let mut content = String::new();
        stream.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "<b>note</b>");
    }
}
