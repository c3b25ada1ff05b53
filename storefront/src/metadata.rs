//! Asset descriptors as produced by the usual NFT asset tooling: one
//! `<index>.json` file per asset.
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::MetadataError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub properties: Option<Properties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub files: Vec<FileReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReference {
    pub uri: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

impl AssetMetadata {
    /// The first file reference, which is what gets minted.
    pub fn content_uri(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|properties| properties.files.first())
            .map(|file| file.uri.as_str())
    }
}

pub fn metadata_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{}.json", index))
}

pub fn load_metadata(path: &Path) -> Result<AssetMetadata, MetadataError> {
    let raw = fs::read_to_string(path).map_err(|source| MetadataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| MetadataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads `0.json` through `<count - 1>.json` from `dir`, in order.
pub fn load_metadata_dir(dir: &Path, count: usize) -> Result<Vec<AssetMetadata>, MetadataError> {
    (0..count)
        .map(|index| {
            let path = metadata_path(dir, index);
            debug!("Loading asset metadata from {}", path.display());
            load_metadata(&path)
        })
        .collect()
}
