//! Canonical asset paths and symbol-safe identifier derivation.

/// Normalize a raw asset path into its canonical lookup key.
///
/// Backslashes become forward slashes, the configured prefix is stripped when
/// it is a literal leading substring (otherwise the path passes through
/// unstripped), and redundant leading slashes are removed. Canonicalizing an
/// already-canonical path returns it unchanged.
pub fn canonical_asset_path(raw: &str, prefix: Option<&str>) -> String {
  let mut path = raw.replace('\\', "/");
  if let Some(prefix) = prefix
    && !prefix.is_empty()
    && let Some(stripped) = path.strip_prefix(prefix)
  {
    path = stripped.to_string();
  }
  path.trim_start_matches('/').to_string()
}

/// Derive the symbol-safe identifier used to name an asset in generated code.
///
/// The derivation is pure: the path is lower-cased and each space, dot,
/// hyphen, and path separator becomes its own underscore, with no collapsing
/// of runs. A leading digit gains an underscore prefix so the result is a
/// valid Rust identifier.
pub fn asset_identifier(path: &str) -> String {
  let mut identifier = String::with_capacity(path.len() + 1);
  for c in path.chars() {
    match c {
      ' ' | '.' | '-' | '/' => identifier.push('_'),
      _ => identifier.extend(c.to_lowercase()),
    }
  }
  if identifier.starts_with(|c: char| c.is_ascii_digit()) {
    identifier.insert(0, '_');
  }
  identifier
}
