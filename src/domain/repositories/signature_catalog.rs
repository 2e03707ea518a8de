//! Signature catalog trait

use crate::domain::entities::{FormatId, Signature, SignatureError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a signature catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid signature at index {index}: {source}")]
    InvalidSignature {
        index: usize,
        #[source]
        source: SignatureError,
    },

    #[error("Invalid hex pattern '{pattern}' at index {index}: {source}")]
    InvalidHex {
        index: usize,
        pattern: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown extension in filter: {0}")]
    UnknownExtension(String),
}

/// An ordered, immutable collection of signatures
///
/// The position of a signature in [`list`](SignatureCatalog::list) is its
/// [`FormatId`] for the whole run.
pub trait SignatureCatalog: Send + Sync {
    fn list(&self) -> &[Signature];

    fn get(&self, id: FormatId) -> Option<&Signature> {
        self.list().get(id.index())
    }

    fn len(&self) -> usize {
        self.list().len()
    }

    fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    /// Whether `sig` is scanned when no extension filter is given
    fn selected_by_default(&self, _sig: &Signature) -> bool {
        true
    }

    /// Signatures whose extension is in `extensions`, in catalog order
    ///
    /// An empty filter selects every signature that is
    /// [`selected_by_default`](SignatureCatalog::selected_by_default).
    /// Matching ignores ASCII case, and every requested extension must name
    /// at least one signature.
    fn select(&self, extensions: &[String]) -> Result<Vec<Signature>, CatalogError> {
        let list = self.list();
        if extensions.is_empty() {
            return Ok(list
                .iter()
                .filter(|&sig| self.selected_by_default(sig))
                .cloned()
                .collect());
        }
        let wanted = |sig: &Signature, ext: &String| sig.extension().eq_ignore_ascii_case(ext);

        if let Some(unknown) = extensions
            .iter()
            .find(|&ext| !list.iter().any(|sig| wanted(sig, ext)))
        {
            return Err(CatalogError::UnknownExtension(unknown.to_ascii_lowercase()));
        }

        Ok(list
            .iter()
            .filter(|&sig| extensions.iter().any(|ext| wanted(sig, ext)))
            .cloned()
            .collect())
    }
}
