//! Render the generated Rust source embedding the bundled assets.

use std::collections::BTreeSet;

use crate::config::Config;
use crate::encoding::AssetContent;
use crate::models::BundledAsset;

/// Render the complete generated module for a bundling run.
///
/// The artifact holds one `static` byte payload per embedded asset, named by
/// the asset's identifier, a lazily initialized [`crate::AssetStore`], the
/// named entry accessor, and public wrappers for every store operation.
/// Debug bundles embed no payloads; each entry records the absolute source
/// path captured at bundling time.
pub fn render_bundle(config: &Config, assets: &[BundledAsset]) -> String {
  let mut statics = Vec::new();
  let mut inserts = Vec::new();
  let mut used_names = BTreeSet::new();

  for asset in assets {
    let key = quote(&asset.path);
    let meta = format!(
      "AssetMetadata {{ size: {}, mode: 0o{:o}, modified: {} }}",
      asset.meta.size, asset.meta.mode, asset.meta.modified
    );
    let content = match &asset.content {
      AssetContent::Raw(bytes) => {
        let name = static_name(&asset.identifier, &mut used_names);
        statics.push(format!("static {}: &[u8] = {};", name, byte_literal(bytes)));
        format!("AssetContent::raw({name})")
      }
      AssetContent::Gzip(bytes) => {
        let name = static_name(&asset.identifier, &mut used_names);
        statics.push(format!("static {}: &[u8] = {};", name, byte_literal(bytes)));
        format!("AssetContent::gzip({name})")
      }
      AssetContent::Disk(source) => {
        format!("AssetContent::disk({})", quote(&source.to_string_lossy()))
      }
    };
    inserts.push(format!("  bundle.insert({key}, {content}, {meta});"));
  }

  let statics_block = if statics.is_empty() {
    String::new()
  } else {
    format!("\n{}\n", statics.join("\n\n"))
  };
  let bundle_binding = if inserts.is_empty() { "let bundle" } else { "let mut bundle" };
  let insert_block =
    if inserts.is_empty() { String::new() } else { format!("{}\n", inserts.join("\n")) };

  format!(
    r#"//! Embedded asset bundle `{package}`.
//!
//! Code generated by embedir. DO NOT EDIT.

use std::path::Path;
use std::sync::LazyLock;

use embedir::{{AssetContent, AssetMetadata, AssetStore, StoreError}};
{statics_block}
static STORE: LazyLock<AssetStore> = LazyLock::new(|| {{
  {bundle_binding} = AssetStore::builder();
{insert_block}  bundle.build()
}});

/// Shared handle to the embedded asset store.
pub fn {entry}() -> &'static AssetStore {{
  &STORE
}}

/// Decoded content of the asset at `path`.
pub fn get(path: &str) -> Result<Vec<u8>, StoreError> {{
  STORE.get(path)
}}

/// Like [`get`], but panics when the asset is missing or unreadable.
pub fn must_get(path: &str) -> Vec<u8> {{
  STORE.must_get(path)
}}

/// Metadata snapshot recorded for the asset at `path`.
pub fn get_info(path: &str) -> Result<AssetMetadata, StoreError> {{
  STORE.get_info(path)
}}

/// Every asset path embedded in this bundle.
pub fn list() -> Vec<&'static str> {{
  STORE.list()
}}

/// Child names of the bundled directory at `path`; `""` lists the root.
pub fn list_dir(path: &str) -> Result<Vec<&'static str>, StoreError> {{
  STORE.list_dir(path)
}}

/// Restore the asset or directory at `path` under `target_dir`.
pub fn restore(target_dir: &Path, path: &str) -> Result<(), StoreError> {{
  STORE.restore(target_dir, path)
}}

/// Restore every embedded asset under `target_dir`.
pub fn restore_all(target_dir: &Path) -> Result<(), StoreError> {{
  STORE.restore_all(target_dir)
}}
"#,
    package = config.package,
    entry = config.entry,
    statics_block = statics_block,
    bundle_binding = bundle_binding,
    insert_block = insert_block,
  )
}

/// Quote a string as a Rust literal.
fn quote(value: &str) -> String {
  serde_json::to_string(value).unwrap()
}

/// Generated static name for an asset payload, deduplicating collisions.
fn static_name(identifier: &str, used: &mut BTreeSet<String>) -> String {
  let base = identifier.to_ascii_uppercase();
  let mut candidate = base.clone();
  let mut counter = 1;
  while used.contains(&candidate) {
    candidate = format!("{base}_{counter}");
    counter += 1;
  }
  used.insert(candidate.clone());
  candidate
}

/// Render bytes as an escaped byte-string literal, wrapped every 16 bytes.
fn byte_literal(bytes: &[u8]) -> String {
  let mut literal = String::with_capacity(bytes.len() * 4 + 8);
  literal.push_str("b\"");
  for (index, byte) in bytes.iter().enumerate() {
    if index != 0 && index % 16 == 0 {
      literal.push_str("\\\n  ");
    }
    literal.push_str(&format!("\\x{byte:02x}"));
  }
  literal.push('"');
  literal
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::encoding::{debug_asset, encode_asset};
  use crate::models::AssetMetadata;
  use std::path::PathBuf;

  fn meta() -> AssetMetadata {
    AssetMetadata { size: 6, mode: 0o644, modified: 1_431_385_279 }
  }

  fn config() -> Config {
    let mut config = Config::new("data");
    config.package = "demo".to_string();
    config.entry = "data".to_string();
    config
  }

  fn raw_asset(path: &str, content: &[u8]) -> BundledAsset {
    BundledAsset {
      path: path.to_string(),
      identifier: crate::asset_paths::asset_identifier(path),
      content: encode_asset(content.to_vec(), false).unwrap(),
      meta: meta(),
    }
  }

  #[test]
  fn renders_statics_store_and_wrappers() {
    let assets = vec![raw_asset("a/test.asset", b"hi")];
    let source = render_bundle(&config(), &assets);

    assert!(source.contains("Code generated by embedir. DO NOT EDIT."));
    assert!(source.contains("Embedded asset bundle `demo`."));
    assert!(source.contains("static A_TEST_ASSET: &[u8] = b\"\\x68\\x69\";"));
    assert!(source.contains(
      "bundle.insert(\"a/test.asset\", AssetContent::raw(A_TEST_ASSET), \
       AssetMetadata { size: 6, mode: 0o644, modified: 1431385279 });"
    ));
    assert!(source.contains("pub fn data() -> &'static AssetStore {"));
    for wrapper in ["get", "must_get", "get_info", "list", "list_dir", "restore", "restore_all"] {
      assert!(source.contains(&format!("pub fn {wrapper}(")), "missing wrapper `{wrapper}`");
    }
  }

  #[test]
  fn compressed_assets_use_the_gzip_constructor() {
    let asset = BundledAsset {
      path: "a/test.asset".to_string(),
      identifier: "a_test_asset".to_string(),
      content: encode_asset(b"hello\n".to_vec(), true).unwrap(),
      meta: meta(),
    };
    let source = render_bundle(&config(), &[asset]);
    assert!(source.contains("AssetContent::gzip(A_TEST_ASSET)"));
  }

  #[test]
  fn debug_bundles_embed_paths_instead_of_payloads() {
    let asset = BundledAsset {
      path: "a/test.asset".to_string(),
      identifier: "a_test_asset".to_string(),
      content: debug_asset(PathBuf::from("/srv/data/a/test.asset")),
      meta: meta(),
    };
    let source = render_bundle(&config(), &[asset]);
    assert!(source.contains("AssetContent::disk(\"/srv/data/a/test.asset\")"));
    assert!(!source.contains("static A_TEST_ASSET"));
  }

  #[test]
  fn colliding_identifiers_get_numeric_suffixes() {
    let assets = vec![raw_asset("a.b", b"x"), raw_asset("a-b", b"y")];
    let source = render_bundle(&config(), &assets);
    assert!(source.contains("static A_B: &[u8]"));
    assert!(source.contains("static A_B_1: &[u8]"));
  }

  #[test]
  fn byte_literals_wrap_long_payloads() {
    let literal = byte_literal(&[0u8; 20]);
    assert!(literal.starts_with("b\"\\x00"));
    assert!(literal.contains("\\\n  "));
    assert_eq!(byte_literal(b""), "b\"\"");
  }
}
