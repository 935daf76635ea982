//! Dataset location settings, resolved by the caller before a catalog is built.
//!
//! The catalog itself never reads the environment or probes the filesystem
//! for paths; it is handed a [`ResolvedPaths`] value.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::RecountResult;

pub const DEFAULT_IMAGE_DIR: &str = "rec-8k";
pub const DEFAULT_ANNOTATION_FILE: &str = "anno/annotations.json";
pub const DEFAULT_SPLIT_FILE: &str = "anno/splits.json";

pub const ENV_DATA_ROOT: &str = "RECOUNT_DATA_ROOT";
pub const ENV_IMAGE_DIR: &str = "RECOUNT_IMAGE_DIR";
pub const ENV_ANNOTATION_FILE: &str = "RECOUNT_ANNOTATION_FILE";
pub const ENV_SPLIT_FILE: &str = "RECOUNT_SPLIT_FILE";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory containing the image folder.
    pub data_root: PathBuf,
    /// Image folder name under `data_root`.
    pub image_dir: String,
    pub annotation_file: PathBuf,
    pub split_file: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            image_dir: DEFAULT_IMAGE_DIR.to_string(),
            annotation_file: PathBuf::from(DEFAULT_ANNOTATION_FILE),
            split_file: PathBuf::from(DEFAULT_SPLIT_FILE),
        }
    }
}

/// Concrete locations the catalog is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub image_root: String,
    pub annotation_file: PathBuf,
    pub split_file: PathBuf,
}

impl CatalogConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> RecountResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Defaults overlaid with any non-empty `RECOUNT_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|name| std::env::var(name).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        if let Some(v) = read(ENV_DATA_ROOT) {
            self.data_root = PathBuf::from(v);
        }
        if let Some(v) = read(ENV_IMAGE_DIR) {
            self.image_dir = v;
        }
        if let Some(v) = read(ENV_ANNOTATION_FILE) {
            self.annotation_file = PathBuf::from(v);
        }
        if let Some(v) = read(ENV_SPLIT_FILE) {
            self.split_file = PathBuf::from(v);
        }
        self
    }

    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    pub fn with_image_dir(mut self, image_dir: impl Into<String>) -> Self {
        self.image_dir = image_dir.into();
        self
    }

    pub fn with_annotation_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.annotation_file = path.into();
        self
    }

    pub fn with_split_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.split_file = path.into();
        self
    }

    /// `image_root` is `data_root/image_dir`; source files are used as given.
    pub fn resolve(&self) -> ResolvedPaths {
        ResolvedPaths {
            image_root: self
                .data_root
                .join(&self.image_dir)
                .to_string_lossy()
                .into_owned(),
            annotation_file: self.annotation_file.clone(),
            split_file: self.split_file.clone(),
        }
    }
}
