//! Embedded content representations and the gzip codec.

use std::borrow::Cow;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::store::StoreError;

/// Embedding strategy selected by the bundling configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
  /// Gzip-compress asset content before embedding it.
  Compress,
  /// Embed asset content verbatim.
  NoCompress,
  /// Skip embedding and re-read assets from their source paths at call time.
  Debug,
}

/// Embedded representation of one asset's content.
///
/// Payloads are [`Cow`]s so generated code can reference `'static` byte data
/// without copying while the bundler holds owned buffers.
#[derive(Debug, Clone)]
pub enum AssetContent {
  /// Verbatim bytes captured at bundling time.
  Raw(Cow<'static, [u8]>),
  /// A complete gzip stream captured at bundling time, decodable with no
  /// external side data.
  Gzip(Cow<'static, [u8]>),
  /// Absolute source path re-read on every access (debug bundles).
  Disk(Cow<'static, Path>),
}

impl AssetContent {
  /// Wrap embedded verbatim bytes.
  pub fn raw(bytes: &'static [u8]) -> Self {
    AssetContent::Raw(Cow::Borrowed(bytes))
  }

  /// Wrap an embedded gzip stream.
  pub fn gzip(bytes: &'static [u8]) -> Self {
    AssetContent::Gzip(Cow::Borrowed(bytes))
  }

  /// Reference the on-disk source file of a debug-bundle asset.
  pub fn disk(path: &'static str) -> Self {
    AssetContent::Disk(Cow::Borrowed(Path::new(path)))
  }

  /// Decode the representation back into the original content bytes.
  ///
  /// Decoding is the exact inverse of encoding: gzip payloads decompress to
  /// byte-for-byte identical content, and any framing or checksum error
  /// surfaces as [`StoreError::Codec`]. Debug-bundle entries read the current
  /// file state instead. `path` is the canonical asset path, carried for
  /// error context only.
  pub fn load(&self, path: &str) -> Result<Vec<u8>, StoreError> {
    match self {
      AssetContent::Raw(bytes) => Ok(bytes.to_vec()),
      AssetContent::Gzip(data) => {
        let mut content = Vec::with_capacity(data.len() * 2);
        GzDecoder::new(&data[..])
          .read_to_end(&mut content)
          .map_err(|source| StoreError::Codec { path: path.to_string(), source })?;
        Ok(content)
      }
      AssetContent::Disk(file) => {
        fs::read(file).map_err(|source| StoreError::Read { path: path.to_string(), source })
      }
    }
  }
}

/// Encode captured content according to the compression toggle.
pub fn encode_asset(content: Vec<u8>, compress: bool) -> Result<AssetContent> {
  if !compress {
    return Ok(AssetContent::Raw(Cow::Owned(content)));
  }
  let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
  encoder.write_all(&content).context("gzip write")?;
  let compressed = encoder.finish().context("gzip finish")?;
  Ok(AssetContent::Gzip(Cow::Owned(compressed)))
}

/// Record the source path of a debug-bundle asset without capturing content.
pub fn debug_asset(source: PathBuf) -> AssetContent {
  AssetContent::Disk(Cow::Owned(source))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn gzip_round_trips_byte_for_byte() {
    let original = b"hello\n".repeat(64);
    let encoded = encode_asset(original.clone(), true).unwrap();
    assert!(matches!(encoded, AssetContent::Gzip(_)));
    assert_eq!(encoded.load("a/test.asset").unwrap(), original);
  }

  #[test]
  fn raw_mode_embeds_verbatim() {
    let encoded = encode_asset(b"hello\n".to_vec(), false).unwrap();
    let AssetContent::Raw(ref bytes) = encoded else {
      panic!("expected raw content");
    };
    assert_eq!(bytes.as_ref(), b"hello\n");
    assert_eq!(encoded.load("a/test.asset").unwrap(), b"hello\n");
  }

  #[test]
  fn corrupt_gzip_surfaces_a_codec_error() {
    let corrupt = AssetContent::Gzip(Cow::Borrowed(b"not a gzip stream"));
    let err = corrupt.load("a/test.asset").unwrap_err();
    assert!(matches!(err, StoreError::Codec { ref path, .. } if path == "a/test.asset"));
  }

  #[test]
  fn truncated_gzip_is_not_silently_accepted() {
    let encoded = encode_asset(b"hello\n".repeat(64), true).unwrap();
    let AssetContent::Gzip(full) = encoded else {
      panic!("expected gzip content");
    };
    let truncated = AssetContent::Gzip(Cow::Owned(full[..full.len() / 2].to_vec()));
    assert!(truncated.load("a/test.asset").is_err());
  }

  #[test]
  fn debug_content_reads_current_disk_state() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("live.txt");
    fs::write(&file, "first").unwrap();

    let content = debug_asset(file.clone());
    assert_eq!(content.load("live.txt").unwrap(), b"first");

    fs::write(&file, "second").unwrap();
    assert_eq!(content.load("live.txt").unwrap(), b"second");
  }

  #[test]
  fn debug_read_failure_names_the_asset() {
    let content = debug_asset(PathBuf::from("/no/such/source"));
    let err = content.load("gone.txt").unwrap_err();
    assert!(matches!(err, StoreError::Read { ref path, .. } if path == "gone.txt"));
  }
}
