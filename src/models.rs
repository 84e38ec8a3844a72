//! Data structures produced while bundling a directory of assets.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::encoding::AssetContent;

/// Immutable metadata snapshot captured from a source file at bundling time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetMetadata {
  /// Size of the original content in bytes.
  pub size: u64,
  /// Unix permission bits of the source file.
  pub mode: u32,
  /// Last-modification time as seconds since the unix epoch.
  pub modified: i64,
}

impl AssetMetadata {
  /// Capture a snapshot from filesystem metadata.
  pub fn capture(meta: &fs::Metadata) -> Self {
    Self {
      size: meta.len(),
      mode: permission_bits(meta),
      modified: unix_seconds(meta.modified().ok()),
    }
  }

  /// The recorded modification time as a [`SystemTime`].
  pub fn modified_time(&self) -> SystemTime {
    if self.modified >= 0 {
      UNIX_EPOCH + Duration::from_secs(self.modified as u64)
    } else {
      UNIX_EPOCH - Duration::from_secs(self.modified.unsigned_abs())
    }
  }
}

/// One regular file discovered while walking the input root.
#[derive(Debug, Clone)]
pub struct DiscoveredAsset {
  /// Canonical forward-slash path identifying the asset.
  pub path: String,
  /// Symbol-safe identifier derived from the canonical path.
  pub identifier: String,
  /// Location of the source file on disk.
  pub source: PathBuf,
  /// Metadata snapshot taken at discovery.
  pub meta: AssetMetadata,
}

/// A discovered asset paired with its embedded content representation.
#[derive(Debug)]
pub struct BundledAsset {
  /// Canonical forward-slash path identifying the asset.
  pub path: String,
  /// Symbol-safe identifier derived from the canonical path.
  pub identifier: String,
  /// Encoded content as it will be embedded in the artifact.
  pub content: AssetContent,
  /// Metadata snapshot carried alongside the content.
  pub meta: AssetMetadata,
}

#[cfg(unix)]
fn permission_bits(meta: &fs::Metadata) -> u32 {
  use std::os::unix::fs::PermissionsExt;
  meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(_meta: &fs::Metadata) -> u32 {
  0o644
}

fn unix_seconds(time: Option<SystemTime>) -> i64 {
  let Some(time) = time else { return 0 };
  match time.duration_since(UNIX_EPOCH) {
    Ok(elapsed) => elapsed.as_secs() as i64,
    Err(before_epoch) => -(before_epoch.duration().as_secs() as i64),
  }
}
