//! Link note renderer.

use super::TemplateError;
use handlebars::{no_escape, Handlebars, Template};
use serde_json::json;

/// Dot-prefixed variable accepted for compatibility with older link texts.
const LEGACY_LINK_VARIABLE: &str = ".Link";

/// Rewrites `{{.Link}}` (with optional inner whitespace) to `{{Link}}`.
fn normalize_legacy_link(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let (before, after) = rest.split_at(start + 2);
        out.push_str(before);
        rest = after;

        let closing = after
            .trim_start()
            .strip_prefix(LEGACY_LINK_VARIABLE)
            .map(str::trim_start)
            .and_then(|tail| tail.strip_prefix("}}"));
        if let Some(tail) = closing {
            out.push_str("Link}}");
            rest = tail;
        }
    }
    out.push_str(rest);
    out
}

/// Creates a Handlebars registry for plain-text notes.
///
/// The registry is configured with:
/// - No HTML escaping (notes are markdown)
/// - Strict mode (unknown variables fail the render)
#[must_use]
fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs
}

/// Renders link note templates.
pub struct LinkRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for LinkRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkRenderer {
    /// Creates a new renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders `template` with `Link` bound to `link`.
    ///
    /// # Arguments
    ///
    /// * `template` - Note text, e.g. `Closed in favor of {{Link}}`
    /// * `link` - Destination issue reference, e.g. `group/project#12`
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Parse`] for malformed templates and
    /// [`TemplateError::Render`] when rendering fails.
    pub fn render_link(&self, template: &str, link: &str) -> Result<String, TemplateError> {
        let template = normalize_legacy_link(template);
        Template::compile(&template)?;
        Ok(self
            .handlebars
            .render_template(&template, &json!({ "Link": link }))?)
    }
}
