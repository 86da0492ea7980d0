//! Raw byte loading and legacy text decoding
//!
//! Export bytes arrive from an upload buffer, a local file or a buffer that an
//! external storage connector already fetched. All of them are decoded with
//! the single legacy 8-bit encoding of the accounting system and split into
//! lines.

use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::MISDECODED_UTF8_BOM;
use crate::{Error, Result};

/// Where the bytes of one export come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteSource {
    /// In-memory upload buffer
    Buffer { name: String, bytes: Vec<u8> },
    /// File on the local filesystem
    Path(PathBuf),
    /// Bytes fetched by a remote storage connector
    Remote { name: String, bytes: Vec<u8> },
}

impl ByteSource {
    pub fn buffer(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Buffer {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    pub fn remote(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Remote {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Display name used in logs, reports and errors
    pub fn name(&self) -> String {
        match self {
            Self::Buffer { name, .. } | Self::Remote { name, .. } => name.clone(),
            Self::Path(path) => path.display().to_string(),
        }
    }

    /// Read the complete byte content once
    pub fn read_bytes(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Self::Buffer { bytes, .. } | Self::Remote { bytes, .. } => Ok(Cow::Borrowed(bytes)),
            Self::Path(path) => std::fs::read(path)
                .map(Cow::Owned)
                .map_err(|e| Error::source_unavailable(path.display().to_string(), e)),
        }
    }
}

/// Decoded export text split into physical lines
#[derive(Debug, Clone)]
pub struct RawText {
    pub source_name: String,
    pub lines: Vec<String>,
}

/// Load and decode a byte source
pub fn load(source: &ByteSource) -> Result<RawText> {
    let bytes = source.read_bytes()?;
    let text = decode_legacy(&bytes);
    let lines = split_lines(&text);

    debug!(
        "Loaded {} bytes ({} lines) from {}",
        bytes.len(),
        lines.len(),
        source.name()
    );

    Ok(RawText {
        source_name: source.name(),
        lines,
    })
}

/// Decode bytes with the legacy encoding
///
/// Bytes are never rejected: every Windows-1252 byte maps to some character.
/// A UTF-8 byte order mark shows up as three Latin characters and is removed.
pub fn decode_legacy(bytes: &[u8]) -> String {
    let (text, _had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
    match text.strip_prefix(MISDECODED_UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}

/// Encode text the way the accounting system writes its exports
///
/// Characters outside Windows-1252 become numeric character references.
pub fn encode_legacy(text: &str) -> Vec<u8> {
    let (bytes, _, _had_unmappable) = WINDOWS_1252.encode(text);
    bytes.into_owned()
}

/// Split on line feeds, dropping a trailing carriage return per line
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
