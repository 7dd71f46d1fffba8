use quantum_core::api::ResponseBackend;

const QUERY_PLACEHOLDER: &str = "{query}";

/// Answers every query with a fixed template, substituting the query text for
/// each `{query}` placeholder.
#[derive(Debug, Clone)]
pub struct TemplateBackend {
    template: String,
}

impl TemplateBackend {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl ResponseBackend for TemplateBackend {
    fn name(&self) -> &str {
        "template"
    }

    fn compose(&self, query: &str) -> String {
        self.template.replace(QUERY_PLACEHOLDER, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quantum_core::config::DEFAULT_RESPONSE_TEMPLATE;

    #[test]
    fn test_default_template_quotes_query() {
        let backend = TemplateBackend::new(DEFAULT_RESPONSE_TEMPLATE);
        let out = backend.compose("What is Rust?");
        assert!(out.starts_with("Response to query: \"What is Rust?\"\n\n"));
        assert!(out.ends_with("based on available data."));
    }

    #[test]
    fn test_every_placeholder_replaced() {
        let backend = TemplateBackend::new("{query} / {query}");
        assert_eq!(backend.compose("x"), "x / x");
    }

    #[test]
    fn test_template_without_placeholder_is_constant() {
        let backend = TemplateBackend::new("fixed");
        assert_eq!(backend.compose("a"), backend.compose("b"));
    }

    #[test]
    fn test_braces_in_query_not_expanded() {
        let backend = TemplateBackend::new("<{query}>");
        assert_eq!(backend.compose("{query}"), "<{query}>");
    }
}
