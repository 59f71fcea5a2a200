pub mod config;
pub mod template;
pub mod workout;

use std::path::Path;

use anyhow::Result;

use crate::{templates::TemplateCatalog, types::Config};

/// Built-in templates plus the configured and command-line template files,
/// later files taking precedence.
pub fn catalog(cfg: &Config, extra: Option<&Path>) -> Result<TemplateCatalog> {
    let mut catalog = TemplateCatalog::builtin();

    let configured = cfg.templates_path();
    for path in configured.as_deref().into_iter().chain(extra) {
        catalog.merge(TemplateCatalog::load_file(path)?);
    }

    Ok(catalog)
}
