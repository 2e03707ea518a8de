//! Signature entity
//!
//! One file format's header pattern, optional footer pattern and size
//! bounds. Signatures are validated on construction and immutable afterwards.

use std::fmt;
use thiserror::Error;

/// Stable identifier of a format: its index in the loaded catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatId(pub usize);

impl FormatId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reasons a signature record is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature '{0}' has an empty header")]
    EmptyHeader(String),

    #[error("signature '{0}' has an empty footer")]
    EmptyFooter(String),

    #[error("signature '{0}' has no extension")]
    EmptyExtension(String),

    #[error("signature '{extension}' declares min_len {min_len} greater than max_len {max_len}")]
    InvertedBounds {
        extension: String,
        min_len: u64,
        max_len: u64,
    },

    #[error("signature '{0}' has no footer and no max_len; extraction length would be unbounded")]
    UnboundedFooterless(String),

    #[error("signature '{0}' declares max_len 0")]
    ZeroMaxLen(String),
}

/// A file format signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    extension: String,
    header: Vec<u8>,
    footer: Option<Vec<u8>>,
    min_len: Option<u64>,
    max_len: Option<u64>,
    comment: Option<String>,
}

impl Signature {
    /// Creates a header/footer signature without size bounds
    pub fn new(
        extension: impl Into<String>,
        header: impl Into<Vec<u8>>,
        footer: impl Into<Vec<u8>>,
    ) -> Result<Self, SignatureError> {
        Self::build(extension.into(), header.into(), Some(footer.into()), None, None)
    }

    /// Creates a signature with no footer; extraction captures `max_len` bytes
    pub fn footerless(
        extension: impl Into<String>,
        header: impl Into<Vec<u8>>,
        max_len: u64,
    ) -> Result<Self, SignatureError> {
        Self::build(extension.into(), header.into(), None, None, Some(max_len))
    }

    /// Full constructor used by catalog loaders
    pub fn build(
        extension: String,
        header: Vec<u8>,
        footer: Option<Vec<u8>>,
        min_len: Option<u64>,
        max_len: Option<u64>,
    ) -> Result<Self, SignatureError> {
        if extension.is_empty() {
            return Err(SignatureError::EmptyExtension(hex::encode(&header)));
        }
        if header.is_empty() {
            return Err(SignatureError::EmptyHeader(extension));
        }
        if footer.as_ref().is_some_and(|f| f.is_empty()) {
            return Err(SignatureError::EmptyFooter(extension));
        }
        if let (Some(min_len), Some(max_len)) = (min_len, max_len) {
            if min_len > max_len {
                return Err(SignatureError::InvertedBounds {
                    extension,
                    min_len,
                    max_len,
                });
            }
        }
        if footer.is_none() && max_len.is_none() {
            return Err(SignatureError::UnboundedFooterless(extension));
        }
        if max_len == Some(0) {
            return Err(SignatureError::ZeroMaxLen(extension));
        }

        Ok(Self {
            extension,
            header,
            footer,
            min_len,
            max_len,
            comment: None,
        })
    }

    /// Sets the minimum carve length (inclusive)
    pub fn with_min_len(mut self, min_len: u64) -> Result<Self, SignatureError> {
        self.min_len = Some(min_len);
        self.check_bounds()?;
        Ok(self)
    }

    /// Sets the maximum carve length (inclusive)
    pub fn with_max_len(mut self, max_len: u64) -> Result<Self, SignatureError> {
        self.max_len = Some(max_len);
        self.check_bounds()?;
        Ok(self)
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    fn check_bounds(&self) -> Result<(), SignatureError> {
        if self.max_len == Some(0) {
            return Err(SignatureError::ZeroMaxLen(self.extension.clone()));
        }
        match (self.min_len, self.max_len) {
            (Some(min_len), Some(max_len)) if min_len > max_len => {
                Err(SignatureError::InvertedBounds {
                    extension: self.extension.clone(),
                    min_len,
                    max_len,
                })
            }
            _ => Ok(()),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn footer(&self) -> Option<&[u8]> {
        self.footer.as_deref()
    }

    pub fn min_len(&self) -> Option<u64> {
        self.min_len
    }

    pub fn max_len(&self) -> Option<u64> {
        self.max_len
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns whether a carve of `len` bytes satisfies the declared bounds
    pub fn accepts_len(&self, len: u64) -> bool {
        self.min_len.is_none_or(|min| len >= min) && self.max_len.is_none_or(|max| len <= max)
    }

    /// Length of the longest pattern this signature contributes
    pub fn longest_pattern(&self) -> usize {
        self.header
            .len()
            .max(self.footer.as_ref().map_or(0, |f| f.len()))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} header={}", self.extension, hex::encode(&self.header))?;
        match &self.footer {
            Some(footer) => write!(f, " footer={}", hex::encode(footer))?,
            None => write!(f, " footer=-")?,
        }
        if let Some(min) = self.min_len {
            write!(f, " min={}", min)?;
        }
        if let Some(max) = self.max_len {
            write!(f, " max={}", max)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_header() {
        let err = Signature::new("jpg", Vec::<u8>::new(), vec![0xFF, 0xD9]).unwrap_err();
        assert_eq!(err, SignatureError::EmptyHeader("jpg".into()));
    }

    #[test]
    fn test_rejects_empty_footer() {
        let err = Signature::new("jpg", vec![0xFF, 0xD8], Vec::<u8>::new()).unwrap_err();
        assert_eq!(err, SignatureError::EmptyFooter("jpg".into()));
    }

    #[test]
    fn test_rejects_unbounded_footerless() {
        let err = Signature::build("bmp".into(), b"BM".to_vec(), None, None, None).unwrap_err();
        assert!(matches!(err, SignatureError::UnboundedFooterless(_)));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let sig = Signature::new("pdf", b"%PDF".to_vec(), b"%%EOF".to_vec())
            .unwrap()
            .with_max_len(10)
            .unwrap();
        assert!(sig.with_min_len(11).is_err());
    }

    #[test]
    fn test_accepts_len_is_inclusive() {
        let sig = Signature::build(
            "x".into(),
            b"H".to_vec(),
            Some(b"F".to_vec()),
            Some(100),
            Some(200),
        )
        .unwrap();
        assert!(!sig.accepts_len(99));
        assert!(sig.accepts_len(100));
        assert!(sig.accepts_len(200));
        assert!(!sig.accepts_len(201));
    }

    #[test]
    fn test_longest_pattern() {
        let sig = Signature::new("png", vec![0x89, 0x50], vec![1, 2, 3, 4]).unwrap();
        assert_eq!(sig.longest_pattern(), 4);
    }
}
