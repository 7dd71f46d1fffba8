use std::io::Write;
use std::sync::Arc;

use anyhow::Result;

use quantum_core::api::{AppConfig, BackendConfig, ResponseBackend, SnapshotRenderer};

use crate::backend::TemplateBackend;
use crate::render::{JsonlRenderer, TextRenderer};

pub fn build_backend(cfg: &AppConfig) -> Arc<dyn ResponseBackend> {
    match &cfg.backend {
        BackendConfig::Template(t) => {
            tracing::debug!(template_chars = t.template.chars().count(), "template backend");
            Arc::new(TemplateBackend::new(t.template.clone()))
        }
    }
}

/// `show_progress` only affects the text renderer's loading bar.
pub fn build_renderer(
    format: &str,
    out: Box<dyn Write + Send>,
    show_progress: bool,
) -> Result<Box<dyn SnapshotRenderer>> {
    match format {
        "text" => Ok(Box::new(TextRenderer::new(out, show_progress))),
        "jsonl" => Ok(Box::new(JsonlRenderer::new(out, false))),
        other => anyhow::bail!("unsupported output format: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantum_core::api::TemplateBackendConfig;

    #[test]
    fn test_backend_from_config() {
        let cfg = AppConfig {
            backend: BackendConfig::Template(TemplateBackendConfig {
                template: "echo: {query}".to_string(),
            }),
            ..Default::default()
        };
        let backend = build_backend(&cfg);
        assert_eq!(backend.name(), "template");
        assert_eq!(backend.compose("hi"), "echo: hi");
    }

    #[test]
    fn test_renderer_by_format() {
        let r = build_renderer("jsonl", Box::new(std::io::sink()), false).unwrap();
        assert_eq!(r.format(), "jsonl");
        let r = build_renderer("text", Box::new(std::io::sink()), false).unwrap();
        assert_eq!(r.format(), "text");
        assert!(build_renderer("yaml", Box::new(std::io::sink()), false).is_err());
    }
}
