//! Bundling configuration surface and its validation rules.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::encoding::EmbedMode;

/// Options steering one bundling run.
#[derive(Debug, Clone)]
pub struct Config {
  /// Bundle name recorded in the generated module header. Cosmetic only.
  pub package: String,
  /// Name of the generated entry accessor function. Cosmetic only.
  pub entry: String,
  /// Directory containing the assets to bundle.
  pub input: PathBuf,
  /// Destination of the generated source file; defaulted by the CLI when
  /// unset.
  pub output: Option<PathBuf>,
  /// Optional literal prefix stripped from every asset path.
  pub prefix: Option<String>,
  /// Gzip-compress embedded content.
  pub compress: bool,
  /// Generate a debug bundle that re-reads assets from disk at call time.
  pub debug: bool,
  /// Descend into subdirectories of the input root.
  pub recursive: bool,
}

impl Config {
  /// Default configuration for the given input directory.
  pub fn new(input: impl Into<PathBuf>) -> Self {
    Self {
      package: "assets".to_string(),
      entry: "assets".to_string(),
      input: input.into(),
      output: None,
      prefix: None,
      compress: true,
      debug: false,
      recursive: false,
    }
  }

  /// Embedding strategy implied by the compress and debug toggles.
  pub fn embed_mode(&self) -> EmbedMode {
    if self.debug {
      EmbedMode::Debug
    } else if self.compress {
      EmbedMode::Compress
    } else {
      EmbedMode::NoCompress
    }
  }

  /// Check the configuration invariants before any bundling work begins.
  ///
  /// The input root must exist and be a directory, and an explicit output
  /// destination must not itself be an existing directory.
  pub fn validate(&self) -> Result<()> {
    if self.package.is_empty() {
      bail!("missing package name");
    }
    if self.entry.is_empty() {
      bail!("missing entry function name");
    }

    let metadata = fs::metadata(&self.input)
      .with_context(|| format!("input path `{}`", self.input.display()))?;
    if !metadata.is_dir() {
      bail!("input path `{}` is not a directory", self.input.display());
    }

    if let Some(output) = &self.output
      && fs::symlink_metadata(output).is_ok_and(|meta| meta.is_dir())
    {
      bail!("output path `{}` is a directory", output.display());
    }

    Ok(())
  }

  /// Collision-avoiding default output path derived from the input path.
  ///
  /// `<input>.rs` next to the input directory, padded `<input>.<N>.rs` with a
  /// sequential number until the name is free.
  pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "bundle".to_string());
    let dir = input.parent().unwrap_or(Path::new(""));

    let candidate = dir.join(format!("{stem}.rs"));
    if fs::symlink_metadata(&candidate).is_err() {
      return candidate;
    }
    let mut counter = 0;
    loop {
      let padded = dir.join(format!("{stem}.{counter}.rs"));
      if fs::symlink_metadata(&padded).is_err() {
        return padded;
      }
      counter += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn rejects_a_missing_input_root() {
    let dir = tempdir().unwrap();
    let config = Config::new(dir.path().join("absent"));
    let err = config.validate().unwrap_err();
    assert!(format!("{err:#}").contains("absent"));
  }

  #[test]
  fn rejects_an_input_that_is_not_a_directory() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "content").unwrap();

    let err = Config::new(&file).validate().unwrap_err();
    assert!(err.to_string().contains("not a directory"));
  }

  #[test]
  fn rejects_an_output_that_is_an_existing_directory() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let mut config = Config::new(dir.path());
    config.output = Some(out);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("is a directory"));
  }

  #[test]
  fn accepts_a_plain_directory_input() {
    let dir = tempdir().unwrap();
    assert!(Config::new(dir.path()).validate().is_ok());
  }

  #[test]
  fn default_output_pads_until_the_name_is_free() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data");
    fs::create_dir(&input).unwrap();

    assert_eq!(Config::default_output(&input), dir.path().join("data.rs"));

    fs::write(dir.path().join("data.rs"), "taken").unwrap();
    assert_eq!(Config::default_output(&input), dir.path().join("data.0.rs"));

    fs::write(dir.path().join("data.0.rs"), "taken").unwrap();
    assert_eq!(Config::default_output(&input), dir.path().join("data.1.rs"));
  }

  #[test]
  fn debug_toggle_overrides_compression() {
    let mut config = Config::new("in");
    assert_eq!(config.embed_mode(), EmbedMode::Compress);
    config.compress = false;
    assert_eq!(config.embed_mode(), EmbedMode::NoCompress);
    config.debug = true;
    assert_eq!(config.embed_mode(), EmbedMode::Debug);
  }
}
