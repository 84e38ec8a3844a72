//! Bundling orchestrator tying the scan, encode, and render stages together.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::encoding::{self, EmbedMode};
use crate::generation::render_bundle;
use crate::models::{BundledAsset, DiscoveredAsset};
use crate::scanning::scan_assets;
use crate::store::AssetStore;

/// Rendered output of one bundling run.
#[derive(Debug)]
pub struct BundleArtifact {
  /// Complete generated Rust source.
  pub source: String,
  /// Number of assets embedded in the artifact.
  pub asset_count: usize,
}

/// High-level helper turning an input directory into a generated bundle.
#[derive(Debug)]
pub struct Bundler {
  config: Config,
}

impl Bundler {
  /// Create a bundler for the provided configuration.
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  /// Validate, scan, encode, and render the generated source.
  ///
  /// Every failure happens before any output exists, so a failed run leaves
  /// no partial artifact behind.
  pub fn build(&self) -> Result<BundleArtifact> {
    let assets = self.bundle_assets()?;
    let source = render_bundle(&self.config, &assets);
    Ok(BundleArtifact { source, asset_count: assets.len() })
  }

  /// Build the equivalent in-memory store without generating source.
  pub fn build_store(&self) -> Result<AssetStore> {
    let mut bundle = AssetStore::builder();
    for asset in self.bundle_assets()? {
      bundle.insert(asset.path, asset.content, asset.meta);
    }
    Ok(bundle.build())
  }

  /// Write a fully rendered artifact to `output` in one shot.
  pub fn write_artifact(output: &Path, artifact: &BundleArtifact) -> Result<()> {
    fs::write(output, &artifact.source)
      .with_context(|| format!("failed to write `{}`", output.display()))
  }

  fn bundle_assets(&self) -> Result<Vec<BundledAsset>> {
    self.config.validate()?;
    let input = std::path::absolute(&self.config.input)
      .with_context(|| format!("failed to resolve `{}`", self.config.input.display()))?;
    let discovered = scan_assets(&input, self.config.prefix.as_deref(), self.config.recursive)?;
    let mode = self.config.embed_mode();

    let mut assets = Vec::with_capacity(discovered.len());
    for DiscoveredAsset { path, identifier, source, meta } in discovered {
      let content = match mode {
        EmbedMode::Debug => encoding::debug_asset(source),
        EmbedMode::Compress | EmbedMode::NoCompress => {
          let bytes = fs::read(&source)
            .with_context(|| format!("failed to read asset `{}`", source.display()))?;
          encoding::encode_asset(bytes, mode == EmbedMode::Compress)
            .with_context(|| format!("failed to encode asset `{path}`"))?
        }
      };
      assets.push(BundledAsset { path, identifier, content, meta });
    }

    Ok(assets)
  }
}
