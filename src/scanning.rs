//! Deterministic filesystem walk discovering the assets to bundle.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::asset_paths::{asset_identifier, canonical_asset_path};
use crate::models::{AssetMetadata, DiscoveredAsset};

/// Walk `input` and return one record per regular file, in stable path order.
///
/// Directory entries are visited lexicographically by name at every level so
/// repeated runs over the same input produce identical output. When
/// `recursive` is false, subdirectories are not descended into and their
/// files are excluded entirely. The walk fails fast, naming the offending
/// path, when the root is missing or any entry becomes unreadable; no
/// partial result is returned on failure.
pub fn scan_assets(
  input: &Path,
  prefix: Option<&str>,
  recursive: bool,
) -> Result<Vec<DiscoveredAsset>> {
  let metadata = fs::metadata(input)
    .with_context(|| format!("input path `{}` is unreadable", input.display()))?;
  if !metadata.is_dir() {
    bail!("input path `{}` is not a directory", input.display());
  }

  let mut assets = Vec::new();
  walk_directory(input, String::new(), prefix, recursive, &mut assets)?;
  Ok(assets)
}

fn walk_directory(
  dir: &Path,
  relative: String,
  prefix: Option<&str>,
  recursive: bool,
  assets: &mut Vec<DiscoveredAsset>,
) -> Result<()> {
  let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)
    .with_context(|| format!("failed to read directory `{}`", dir.display()))?
    .collect::<std::io::Result<_>>()
    .with_context(|| format!("failed to read directory `{}`", dir.display()))?;
  entries.sort_by_key(|entry| entry.file_name());

  for entry in entries {
    let name = entry.file_name().to_string_lossy().into_owned();
    let raw = if relative.is_empty() { name } else { format!("{relative}/{name}") };
    let file_type = entry
      .file_type()
      .with_context(|| format!("failed to stat `{}`", entry.path().display()))?;

    if file_type.is_dir() {
      if recursive {
        walk_directory(&entry.path(), raw, prefix, recursive, assets)?;
      }
      continue;
    }
    if !file_type.is_file() {
      // Sockets, fifos, and symlinks are not assets.
      continue;
    }

    let meta = entry
      .metadata()
      .with_context(|| format!("failed to stat `{}`", entry.path().display()))?;
    let path = canonical_asset_path(&raw, prefix);
    assets.push(DiscoveredAsset {
      identifier: asset_identifier(&path),
      source: entry.path(),
      meta: AssetMetadata::capture(&meta),
      path,
    });
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
  }

  #[test]
  fn discovers_nested_assets_in_stable_order() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("b/test.asset"), "hello\n");
    write_file(&dir.path().join("a/test.asset"), "hello\n");
    write_file(&dir.path().join("top.txt"), "top");

    let assets = scan_assets(dir.path(), None, true).unwrap();
    let paths: Vec<&str> = assets.iter().map(|asset| asset.path.as_str()).collect();
    assert_eq!(paths, ["a/test.asset", "b/test.asset", "top.txt"]);
    assert_eq!(assets[0].identifier, "a_test_asset");
    assert_eq!(assets[0].meta.size, 6);
  }

  #[test]
  fn skips_subdirectories_when_not_recursive() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a/test.asset"), "hello\n");
    write_file(&dir.path().join("top.txt"), "top");

    let assets = scan_assets(dir.path(), None, false).unwrap();
    let paths: Vec<&str> = assets.iter().map(|asset| asset.path.as_str()).collect();
    assert_eq!(paths, ["top.txt"]);
  }

  #[test]
  fn strips_the_configured_prefix_from_keys() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a/test.asset"), "hello\n");

    let assets = scan_assets(dir.path(), Some("a/"), true).unwrap();
    assert_eq!(assets[0].path, "test.asset");
    assert_eq!(assets[0].identifier, "test_asset");
  }

  #[test]
  fn fails_when_the_input_is_missing() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent");
    let err = scan_assets(&missing, None, true).unwrap_err();
    assert!(err.to_string().contains("absent"));
  }

  #[test]
  fn fails_when_the_input_is_a_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    write_file(&file, "not a directory");

    let err = scan_assets(&file, None, true).unwrap_err();
    assert!(err.to_string().contains("not a directory"));
  }
}
