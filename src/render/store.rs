//! Template files on disk.
//!
//! Templates are read on every request so edits to the files show up without a
//! restart. A missing or unreadable file surfaces as `Error::TemplateLoad`.

use crate::{
    errors::{Error, Result},
    render::template::Template,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The printable documents the dashboard produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Fee receipt
    Invoice,
    /// Character certificate
    Certificate,
    /// Term-wise marksheet
    Marksheet,
}

impl TemplateKind {
    /// File name inside the template directory
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Invoice => "invoice.html",
            Self::Certificate => "certificate.html",
            Self::Marksheet => "marksheet.html",
        }
    }
}

/// Loads templates from a directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    /// A store reading from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory templates are read from
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads and parses the template for `kind`.
    pub async fn load(&self, kind: TemplateKind) -> Result<Template> {
        let path = self.root.join(kind.file_name());
        debug!(path = %path.display(), "Loading template");
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| Error::TemplateLoad {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Template::parse(&source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository_store() -> TemplateStore {
        TemplateStore::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"))
    }

    #[tokio::test]
    async fn test_repository_templates_declare_expected_markers() -> Result<()> {
        let store = repository_store();

        let invoice = store.load(TemplateKind::Invoice).await?;
        for marker in [
            "receipt.invoice_no",
            "receipt.date",
            "receipt.amount",
            "receipt.previous_balance",
            "receipt.balance",
            "student.name",
        ] {
            assert!(invoice.has_marker(marker), "invoice lacks {marker}");
        }

        let certificate = store.load(TemplateKind::Certificate).await?;
        assert!(certificate.has_marker("issue_date"));

        let marksheet = store.load(TemplateKind::Marksheet).await?;
        assert!(marksheet.has_marker("term_headers"));
        assert!(marksheet.has_marker("subject_rows"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_directory_is_template_load_error() {
        let store = TemplateStore::new("no/such/templates");
        let result = store.load(TemplateKind::Invoice).await;
        assert!(matches!(result, Err(Error::TemplateLoad { .. })));
    }
}
