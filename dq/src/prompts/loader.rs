//! Prompt library
//!
//! Loads prompt templates from the override directory or falls back to the
//! embedded defaults, and renders them with Handlebars.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::error::PipelineError;

/// Loads and renders prompt templates
pub struct PromptLibrary {
    /// Handlebars template engine (strict, no HTML escaping)
    hbs: Handlebars<'static>,
    /// User override directory
    override_dir: Option<PathBuf>,
}

impl PromptLibrary {
    /// Create a library that prefers `<override_dir>/<name>.pmt` when present
    pub fn new(override_dir: Option<&Path>) -> Self {
        debug!(?override_dir, "PromptLibrary::new: called");
        let override_dir = match override_dir {
            Some(dir) if dir.is_dir() => Some(dir.to_path_buf()),
            Some(dir) => {
                tracing::warn!("Prompt override directory {} does not exist, using embedded prompts", dir.display());
                None
            }
            None => None,
        };
        Self {
            hbs: Self::engine(),
            override_dir,
        }
    }

    /// Create a library that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLibrary::embedded_only: called");
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks the override directory first, then the embedded defaults.
    pub fn load_template(&self, name: &str) -> Result<String, PipelineError> {
        debug!(%name, "PromptLibrary::load_template: called");
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLibrary::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| PipelineError::Prompt(format!("Failed to read prompt {}: {}", path.display(), e)));
            }
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| PipelineError::Prompt(format!("Prompt template not found: {}", name)))
    }

    /// Render a template with the given context
    pub fn render<C: Serialize>(&self, name: &str, context: &C) -> Result<String, PipelineError> {
        debug!(%name, "PromptLibrary::render: called");
        let template = self.load_template(name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| PipelineError::Prompt(format!("Failed to render template {}: {}", name, e)))
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::embedded_only()
    }
}
