use std::path::Path;

use tether_core::{Document, Node};
use tether_runtime::ViewModel;

use crate::config::AppConfig;
use crate::error::{CliError, Result};

/// A template document with its view model mounted.
pub struct Mounted {
    pub doc: Document,
    pub vm: ViewModel,
}

impl Mounted {
    /// Read and parse `template`, then mount `config` on it.
    pub fn load(template: &Path, config: &AppConfig) -> Result<Self> {
        let source = std::fs::read_to_string(template).map_err(|source| CliError::ReadFile {
            path: template.to_path_buf(),
            source,
        })?;
        Self::from_source(&source, config)
    }

    pub fn from_source(source: &str, config: &AppConfig) -> Result<Self> {
        let doc = Document::parse(source)?;
        let vm = ViewModel::mount(config.to_options(), &doc)?;
        tracing::debug!(
            message = "cli.mounted",
            el = %config.el,
            compiled = vm.is_compiled(),
            bindings = vm.bindings().len()
        );
        Ok(Self { doc, vm })
    }

    /// First element matching `selector` anywhere in the document.
    pub fn target(&self, selector: &str) -> Result<Node> {
        self.doc
            .query_selector(selector)?
            .ok_or_else(|| CliError::TargetNotFound {
                selector: selector.to_string(),
            })
    }

    /// HTML of the compiled root, or of the whole document when nothing was
    /// compiled.
    #[must_use]
    pub fn html(&self) -> String {
        match self.vm.root() {
            Some(root) => root.outer_html(),
            None => self.doc.to_html(),
        }
    }
}
