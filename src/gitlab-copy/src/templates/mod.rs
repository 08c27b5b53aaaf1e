//! Rendering of the cross-reference note left on migrated source issues.
//!
//! The note text is a Handlebars template with a single variable, `Link`,
//! bound to the destination issue reference.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::LinkRenderer;
