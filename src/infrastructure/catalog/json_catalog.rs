//! JSON signature catalog
//!
//! ```json
//! { "signatures": [
//!   { "extension": "jpg", "header": "ffd8ff", "footer": "ffd9",
//!     "min_len": 128, "max_len": 52428800, "comment": "JPEG/JFIF" } ] }
//! ```
//!
//! Patterns are hex strings; whitespace inside them is ignored.

use crate::domain::entities::Signature;
use crate::domain::repositories::{CatalogError, SignatureCatalog};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One signature as written in a catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureRecord {
    pub extension: String,
    pub header: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SignatureRecord {
    fn into_signature(self, index: usize) -> Result<Signature, CatalogError> {
        let header = decode_pattern(index, &self.header)?;
        let footer = self
            .footer
            .as_deref()
            .map(|f| decode_pattern(index, f))
            .transpose()?;

        let signature = Signature::build(self.extension, header, footer, self.min_len, self.max_len)
            .map_err(|source| CatalogError::InvalidSignature { index, source })?;

        Ok(match self.comment {
            Some(comment) => signature.with_comment(comment),
            None => signature,
        })
    }
}

impl From<&Signature> for SignatureRecord {
    fn from(sig: &Signature) -> Self {
        Self {
            extension: sig.extension().to_string(),
            header: hex::encode(sig.header()),
            footer: sig.footer().map(hex::encode),
            min_len: sig.min_len(),
            max_len: sig.max_len(),
            comment: sig.comment().map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    signatures: Vec<SignatureRecord>,
}

fn decode_pattern(index: usize, pattern: &str) -> Result<Vec<u8>, CatalogError> {
    let compact: String = pattern.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact).map_err(|source| CatalogError::InvalidHex {
        index,
        pattern: pattern.to_string(),
        source,
    })
}

/// Catalog loaded from a JSON document
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    signatures: Vec<Signature>,
    origin: PathBuf,
}

impl JsonCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&text, path)?;
        tracing::debug!(
            path = %path.display(),
            signatures = catalog.signatures.len(),
            "loaded signature catalog"
        );
        Ok(catalog)
    }

    /// Parses a catalog document; `origin` is only used in error messages
    pub fn parse(text: &str, origin: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let origin = origin.as_ref().to_path_buf();
        let file: CatalogFile = serde_json::from_str(text).map_err(|source| CatalogError::Parse {
            path: origin.clone(),
            source,
        })?;

        let signatures = file
            .signatures
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_signature(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { signatures, origin })
    }

    pub fn with_extensions(mut self, extensions: &[String]) -> Result<Self, CatalogError> {
        self.signatures = self.select(extensions)?;
        Ok(self)
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }
}

impl SignatureCatalog for JsonCatalog {
    fn list(&self) -> &[Signature] {
        &self.signatures
    }
}
