// TeleSift - core/decode.rs
//
// Byte buffer to text. The controllers write a legacy Korean code page, and
// a dump occasionally contains bytes neither code page accepts. Decoding
// never fails: primary, then fallback, then primary with U+FFFD.

use crate::util::error::ConfigError;
use encoding_rs::Encoding;
use std::borrow::Cow;

/// Which decoding step produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePath {
    Primary,
    Fallback,
    /// Primary code page with malformed sequences replaced.
    Lossy,
}

#[derive(Debug)]
pub struct DecodeOutcome<'a> {
    pub text: Cow<'a, str>,
    /// Canonical name of the encoding that produced `text`.
    pub encoding: &'static str,
    pub path: DecodePath,
}

/// A primary/fallback code page pair.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    primary: &'static Encoding,
    fallback: &'static Encoding,
}

impl Decoder {
    /// Resolve WHATWG encoding labels (e.g. "windows-949", "euc-kr").
    pub fn from_labels(primary: &str, fallback: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            primary: resolve(primary)?,
            fallback: resolve(fallback)?,
        })
    }

    pub fn primary_name(&self) -> &'static str {
        self.primary.name()
    }

    pub fn fallback_name(&self) -> &'static str {
        self.fallback.name()
    }

    pub fn decode<'a>(&self, bytes: &'a [u8]) -> DecodeOutcome<'a> {
        if let Some(text) = self
            .primary
            .decode_without_bom_handling_and_without_replacement(bytes)
        {
            return DecodeOutcome {
                text,
                encoding: self.primary.name(),
                path: DecodePath::Primary,
            };
        }

        if let Some(text) = self
            .fallback
            .decode_without_bom_handling_and_without_replacement(bytes)
        {
            tracing::warn!(
                primary = self.primary.name(),
                fallback = self.fallback.name(),
                "Primary decoding failed; used fallback encoding"
            );
            return DecodeOutcome {
                text,
                encoding: self.fallback.name(),
                path: DecodePath::Fallback,
            };
        }

        let (text, _had_errors) = self.primary.decode_without_bom_handling(bytes);
        tracing::warn!(
            encoding = self.primary.name(),
            "Both encodings rejected the buffer; malformed bytes replaced"
        );
        DecodeOutcome {
            text,
            encoding: self.primary.name(),
            path: DecodePath::Lossy,
        }
    }
}

fn resolve(label: &str) -> Result<&'static Encoding, ConfigError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| ConfigError::UnknownEncoding {
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::constants;

    fn default_decoder() -> Decoder {
        Decoder::from_labels(
            constants::DEFAULT_PRIMARY_ENCODING,
            constants::DEFAULT_FALLBACK_ENCODING,
        )
        .unwrap()
    }

    #[test]
    fn test_ascii_decodes_on_primary() {
        let out = default_decoder().decode(b"2024-01-01 10:00:00,200 [12] INFO - FE");
        assert_eq!(out.path, DecodePath::Primary);
        assert_eq!(out.text, "2024-01-01 10:00:00,200 [12] INFO - FE");
    }

    #[test]
    fn test_korean_code_page() {
        // "가" in EUC-KR / CP949
        let out = default_decoder().decode(&[0xB0, 0xA1]);
        assert_eq!(out.path, DecodePath::Primary);
        assert_eq!(out.text, "가");
    }

    #[test]
    fn test_fallback_used_when_primary_rejects() {
        let decoder = Decoder::from_labels("utf-8", "euc-kr").unwrap();
        let out = decoder.decode(&[0xB0, 0xA1]);
        assert_eq!(out.path, DecodePath::Fallback);
        assert_eq!(out.encoding, "EUC-KR");
        assert_eq!(out.text, "가");
    }

    #[test]
    fn test_lossy_when_both_reject() {
        let decoder = Decoder::from_labels("utf-8", "utf-8").unwrap();
        let out = decoder.decode(b"ok \xFF end");
        assert_eq!(out.path, DecodePath::Lossy);
        assert_eq!(out.text, "ok \u{FFFD} end");
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert!(matches!(
            Decoder::from_labels("klingon-1", "euc-kr").unwrap_err(),
            ConfigError::UnknownEncoding { .. }
        ));
    }
}
