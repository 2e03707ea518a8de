//! Built-in signature table
//!
//! The formats a carving run looks for when no catalog file is given.
//!
//! Footerless formats are listed but opt-in: their short headers turn up by
//! chance in ordinary data and every hit would carve `max_len` bytes, so they
//! are only scanned when named explicitly (`-t bmp,tif`).

use crate::domain::entities::{Signature, SignatureError};
use crate::domain::repositories::{CatalogError, SignatureCatalog};

const MIB: u64 = 1024 * 1024;

/// Catalog compiled into the binary
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    signatures: Vec<Signature>,
    /// Set once the table was narrowed by name; everything left is wanted
    narrowed: bool,
}

impl BuiltinCatalog {
    pub fn new() -> Result<Self, CatalogError> {
        let signatures = default_table()
            .into_iter()
            .enumerate()
            .map(|(index, sig)| sig.map_err(|source| CatalogError::InvalidSignature { index, source }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            signatures,
            narrowed: false,
        })
    }

    /// Restricts the catalog to the given extensions
    pub fn with_extensions(mut self, extensions: &[String]) -> Result<Self, CatalogError> {
        self.signatures = self.select(extensions)?;
        self.narrowed |= !extensions.is_empty();
        Ok(self)
    }
}

impl SignatureCatalog for BuiltinCatalog {
    fn list(&self) -> &[Signature] {
        &self.signatures
    }

    fn selected_by_default(&self, sig: &Signature) -> bool {
        self.narrowed || sig.footer().is_some()
    }
}

fn default_table() -> Vec<Result<Signature, SignatureError>> {
    vec![
        // JPEG: SOI marker, ends at EOI
        Signature::build(
            "jpg".into(),
            vec![0xFF, 0xD8, 0xFF],
            Some(vec![0xFF, 0xD9]),
            Some(128),
            Some(50 * MIB),
        )
        .map(|s| s.with_comment("JPEG/JFIF")),
        // PNG: magic, ends after the IEND chunk CRC
        Signature::build(
            "png".into(),
            vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
            Some(vec![0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82]),
            Some(67),
            Some(100 * MIB),
        )
        .map(|s| s.with_comment("Portable Network Graphics")),
        Signature::build(
            "gif".into(),
            b"GIF89a".to_vec(),
            Some(vec![0x00, 0x3B]),
            None,
            Some(50 * MIB),
        )
        .map(|s| s.with_comment("GIF89a")),
        Signature::build(
            "gif".into(),
            b"GIF87a".to_vec(),
            Some(vec![0x00, 0x3B]),
            None,
            Some(50 * MIB),
        )
        .map(|s| s.with_comment("GIF87a")),
        Signature::build(
            "pdf".into(),
            b"%PDF-".to_vec(),
            Some(b"%%EOF".to_vec()),
            None,
            Some(200 * MIB),
        )
        .map(|s| s.with_comment("Portable Document Format")),
        Signature::build(
            "html".into(),
            b"<html".to_vec(),
            Some(b"</html>".to_vec()),
            None,
            Some(10 * MIB),
        ),
        // no reliable footer; size lives in the header
        Signature::build("bmp".into(), b"BM".to_vec(), None, Some(54), Some(16 * MIB))
            .map(|s| s.with_comment("Windows bitmap")),
        Signature::build("tif".into(), vec![0x49, 0x49, 0x2A, 0x00], None, Some(8), Some(64 * MIB))
            .map(|s| s.with_comment("TIFF, little-endian")),
        Signature::build("tif".into(), vec![0x4D, 0x4D, 0x00, 0x2A], None, Some(8), Some(64 * MIB))
            .map(|s| s.with_comment("TIFF, big-endian")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        let catalog = BuiltinCatalog::new().unwrap();
        assert!(catalog.len() >= 8);
        assert!(catalog.list().iter().any(|s| s.extension() == "jpg"));
    }

    #[test]
    fn test_filter_keeps_catalog_order() {
        let catalog = BuiltinCatalog::new()
            .unwrap()
            .with_extensions(&["gif".to_string(), "JPG".to_string()])
            .unwrap();
        let exts: Vec<&str> = catalog.list().iter().map(|s| s.extension()).collect();
        assert_eq!(exts, vec!["jpg", "gif", "gif"]);
    }

    #[test]
    fn test_footerless_formats_are_opt_in() {
        let catalog = BuiltinCatalog::new().unwrap();
        let default = catalog.select(&[]).unwrap();
        assert!(!default.is_empty());
        assert!(default.iter().all(|s| s.footer().is_some()));

        let bmp = catalog.select(&["bmp".to_string()]).unwrap();
        assert_eq!(bmp.len(), 1);
        assert_eq!(bmp[0].max_len(), Some(16 * MIB));

        let narrowed = catalog.with_extensions(&["tif".to_string()]).unwrap();
        assert_eq!(narrowed.select(&[]).unwrap().len(), 2);
    }

    #[test]
    fn test_filter_rejects_unknown_extension() {
        let err = BuiltinCatalog::new()
            .unwrap()
            .with_extensions(&["xyz".to_string()])
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownExtension(e) if e == "xyz"));
    }
}
