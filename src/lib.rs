#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod config;
pub mod encoding;
pub mod generation;
pub mod models;
pub mod scanning;
pub mod store;

pub use builder::{BundleArtifact, Bundler};
pub use config::Config;
pub use encoding::{AssetContent, EmbedMode};
pub use models::AssetMetadata;
pub use store::{AssetNode, AssetStore, StoreError};
