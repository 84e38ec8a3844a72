//! Runtime lookup, traversal, and restore operations over bundled assets.

use std::collections::BTreeMap;
use std::fs::{self, File, FileTimes};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::encoding::AssetContent;
use crate::models::AssetMetadata;

/// Failures surfaced by [`AssetStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
  /// The requested asset path is not present in the bundle.
  #[error("asset `{0}` not found")]
  NotFound(String),
  /// The resolved node is a file where a directory was required.
  #[error("asset `{0}` is not a directory")]
  NotADirectory(String),
  /// An embedded gzip payload failed to decode.
  #[error("asset `{path}`: corrupt compressed payload")]
  Codec {
    /// Canonical path of the asset that failed to decode.
    path: String,
    /// Underlying decoder error.
    #[source]
    source: std::io::Error,
  },
  /// A debug-bundle asset could not be read from its recorded source path.
  #[error("asset `{path}`: source read failed")]
  Read {
    /// Canonical path of the asset that could not be read.
    path: String,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Writing an asset back out to the filesystem failed.
  #[error("restore `{path}` failed")]
  Restore {
    /// Canonical path of the asset being restored.
    path: String,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
}

/// Content and metadata for one bundled asset.
#[derive(Debug)]
pub struct AssetRecord {
  /// Embedded content representation.
  pub content: AssetContent,
  /// Metadata snapshot captured at bundling time.
  pub meta: AssetMetadata,
}

/// Node in the hierarchical mirror of the bundled directory structure.
///
/// A node is exactly one of leaf or interior; the root is always interior.
#[derive(Debug)]
pub enum AssetNode {
  /// Leaf holding the record for one asset.
  File(Arc<AssetRecord>),
  /// Interior node mapping child-name segments to child nodes.
  Dir(BTreeMap<String, AssetNode>),
}

/// Immutable flat table and directory tree over a set of bundled assets.
///
/// Both structures are built once and never mutated, so every operation takes
/// `&self` and arbitrary concurrent callers need no synchronization. The one
/// caveat is debug bundles, where each access performs its own independent
/// file read, and concurrent [`AssetStore::restore`] calls into overlapping
/// target directories, which race last-write-wins.
#[derive(Debug)]
pub struct AssetStore {
  table: BTreeMap<String, Arc<AssetRecord>>,
  root: AssetNode,
}

/// Incremental construction of an [`AssetStore`].
#[derive(Debug, Default)]
pub struct AssetStoreBuilder {
  entries: Vec<(String, Arc<AssetRecord>)>,
}

impl AssetStoreBuilder {
  /// Register one asset under its canonical path.
  pub fn insert(&mut self, path: impl Into<String>, content: AssetContent, meta: AssetMetadata) {
    self.entries.push((path.into(), Arc::new(AssetRecord { content, meta })));
  }

  /// Build the flat table and the directory tree.
  ///
  /// Each record is shared between the table entry and its leaf node, so the
  /// two structures always agree on which loader a path resolves to.
  pub fn build(self) -> AssetStore {
    let mut table = BTreeMap::new();
    let mut root = BTreeMap::new();
    for (path, record) in self.entries {
      insert_node(&mut root, &path, Arc::clone(&record));
      table.insert(path, record);
    }
    AssetStore { table, root: AssetNode::Dir(root) }
  }
}

fn insert_node(children: &mut BTreeMap<String, AssetNode>, path: &str, record: Arc<AssetRecord>) {
  match path.split_once('/') {
    None => {
      children.insert(path.to_string(), AssetNode::File(record));
    }
    Some((segment, rest)) => {
      let child = children
        .entry(segment.to_string())
        .or_insert_with(|| AssetNode::Dir(BTreeMap::new()));
      if let AssetNode::Dir(grandchildren) = child {
        insert_node(grandchildren, rest, record);
      }
    }
  }
}

impl AssetStore {
  /// Start building a store from individual asset entries.
  pub fn builder() -> AssetStoreBuilder {
    AssetStoreBuilder::default()
  }

  /// Look up an asset and return its decoded content.
  ///
  /// The path is backslash-normalized before lookup; embedded keys are
  /// already prefix-stripped. Content is identical across calls, except for
  /// debug bundles where every call re-reads the current disk state.
  pub fn get(&self, path: &str) -> Result<Vec<u8>, StoreError> {
    let key = canonical_key(path);
    let record = self.table.get(&key).ok_or_else(|| StoreError::NotFound(key.clone()))?;
    record.content.load(&key)
  }

  /// Like [`AssetStore::get`], but panics when the asset is missing or
  /// unreadable. Intended for call sites that treat the asset as mandatory.
  pub fn must_get(&self, path: &str) -> Vec<u8> {
    match self.get(path) {
      Ok(content) => content,
      Err(err) => panic!("mandatory asset: {err}"),
    }
  }

  /// Return the metadata snapshot recorded for an asset.
  pub fn get_info(&self, path: &str) -> Result<AssetMetadata, StoreError> {
    let key = canonical_key(path);
    match self.table.get(&key) {
      Some(record) => Ok(record.meta),
      None => Err(StoreError::NotFound(key)),
    }
  }

  /// Every canonical asset path present in the bundle.
  pub fn list(&self) -> Vec<&str> {
    self.table.keys().map(String::as_str).collect()
  }

  /// Ordered child-name segments of the directory at `path`.
  ///
  /// The empty path lists the root. Fails with [`StoreError::NotFound`] when
  /// a segment is absent and [`StoreError::NotADirectory`] when the resolved
  /// node is a file.
  pub fn list_dir(&self, path: &str) -> Result<Vec<&str>, StoreError> {
    let key = canonical_key(path);
    match self.resolve(&key)? {
      AssetNode::Dir(children) => Ok(children.keys().map(String::as_str).collect()),
      AssetNode::File(_) => Err(StoreError::NotADirectory(key)),
    }
  }

  /// Write the asset or directory at `path` back out under `target_dir`.
  ///
  /// Directory nodes restore every descendant leaf. Each restored file gets
  /// its parent directories created first, then the decoded content, the
  /// recorded permission bits, and the recorded modification time. A failure
  /// aborts immediately with the offending path; files already written by
  /// earlier steps are left in place, so callers should treat a failed
  /// multi-file restore as possibly partial.
  pub fn restore(&self, target_dir: &Path, path: &str) -> Result<(), StoreError> {
    let key = canonical_key(path);
    self.restore_node(target_dir, &key, self.resolve(&key)?)
  }

  /// Restore every bundled asset under `target_dir`.
  pub fn restore_all(&self, target_dir: &Path) -> Result<(), StoreError> {
    self.restore(target_dir, "")
  }

  fn resolve(&self, key: &str) -> Result<&AssetNode, StoreError> {
    let mut node = &self.root;
    if key.is_empty() {
      return Ok(node);
    }
    for segment in key.split('/') {
      let AssetNode::Dir(children) = node else {
        return Err(StoreError::NotFound(key.to_string()));
      };
      node = children.get(segment).ok_or_else(|| StoreError::NotFound(key.to_string()))?;
    }
    Ok(node)
  }

  fn restore_node(&self, target_dir: &Path, key: &str, node: &AssetNode) -> Result<(), StoreError> {
    match node {
      AssetNode::Dir(children) => {
        for (name, child) in children {
          let child_key =
            if key.is_empty() { name.clone() } else { format!("{key}/{name}") };
          self.restore_node(target_dir, &child_key, child)?;
        }
        Ok(())
      }
      AssetNode::File(record) => restore_file(target_dir, key, record),
    }
  }
}

fn restore_file(target_dir: &Path, key: &str, record: &AssetRecord) -> Result<(), StoreError> {
  let content = record.content.load(key)?;
  let destination = target_path(target_dir, key);
  let restore_err =
    |source: std::io::Error| StoreError::Restore { path: key.to_string(), source };

  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent).map_err(restore_err)?;
  }

  let mut file = File::create(&destination).map_err(restore_err)?;
  file.write_all(&content).map_err(restore_err)?;
  let stamp = record.meta.modified_time();
  file
    .set_times(FileTimes::new().set_accessed(stamp).set_modified(stamp))
    .map_err(restore_err)?;
  drop(file);

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(&destination, fs::Permissions::from_mode(record.meta.mode))
      .map_err(restore_err)?;
  }

  Ok(())
}

/// Re-join a canonical key under the target directory using the platform
/// separator.
fn target_path(target_dir: &Path, key: &str) -> PathBuf {
  let mut path = target_dir.to_path_buf();
  path.extend(key.split('/'));
  path
}

fn canonical_key(path: &str) -> String {
  path.replace('\\', "/")
}
