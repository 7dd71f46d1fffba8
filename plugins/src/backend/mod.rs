mod template;

pub use template::TemplateBackend;
