//! Rendering - templates, printable documents, and display formatting.

/// Printable invoice, certificate and marksheet documents
pub mod documents;
/// Money, date and HTML-escaping helpers shared by every view
pub mod format;
/// Template files on disk
pub mod store;
/// Marker parsing and substitution
pub mod template;

pub use documents::Documents;
pub use store::{TemplateKind, TemplateStore};
pub use template::{Bindings, Template};
