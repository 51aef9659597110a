use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Templates compiled into the binary. A theme directory can override any of them.
const BUILTIN: &[(&str, &str)] = &[
    ("base.html", include_str!("../theme/base.html")),
    ("index.html", include_str!("../theme/index.html")),
    ("about.html", include_str!("../theme/about.html")),
    ("gallery.html", include_str!("../theme/gallery.html")),
    ("404.html", include_str!("../theme/404.html")),
];

// Tera's default escaper also rewrites `/`, which mangles every URL in an attribute.
fn escape(input: &str) -> String {
    html_escape::encode_quoted_attribute(input).into_owned()
}

pub struct TemplateRenderer {
    tera: Tera,
    context: Context,
}

impl TemplateRenderer {
    /// Load the built-in theme, then any `*.html` files from `theme_dir` on top.
    pub fn new(theme_dir: Option<&Path>) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.set_escape_fn(escape);
        tera.add_raw_templates(BUILTIN.iter().copied())?;

        if let Some(dir) = theme_dir {
            let mut overrides = Vec::new();
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == "html") {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    overrides.push((path, Some(name)));
                }
            }
            tera.add_template_files(overrides)?;
        }

        Ok(Self {
            tera,
            context: Context::new(),
        })
    }

    /// Add a value to the context shared by every render
    pub fn add_to_context<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.context.insert(key, value);
    }

    /// Render a template with the shared context plus page-specific values
    pub fn render(&self, template: &str, page: &Context) -> Result<String, TemplateError> {
        let mut context = self.context.clone();
        context.extend(page.clone());
        Ok(self.tera.render(template, &context)?)
    }
}
