//! Read-only view of the model versions published by the training service.

use log::debug;
use msme_rs_protocol::{VersionInfoResponse, VersionMetadata};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("version catalog read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("version catalog is malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait VersionCatalog: Send + Sync {
    /// Every known version, in publication order.
    fn versions(&self) -> Result<Vec<VersionMetadata>, CatalogError>;

    /// Versions of one model (case-insensitive) and the active one.
    fn model_info(&self, model: &str) -> Result<VersionInfoResponse, CatalogError> {
        let versions: Vec<VersionMetadata> = self
            .versions()?
            .into_iter()
            .filter(|version| version.model.eq_ignore_ascii_case(model.trim()))
            .collect();
        let active = versions.iter().find(|version| version.active).cloned();
        Ok(VersionInfoResponse {
            trained: active.is_some(),
            active,
            versions,
        })
    }
}

/// Catalog fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticVersionCatalog {
    versions: Vec<VersionMetadata>,
}

impl StaticVersionCatalog {
    pub fn new(versions: Vec<VersionMetadata>) -> Self {
        Self { versions }
    }
}

impl VersionCatalog for StaticVersionCatalog {
    fn versions(&self) -> Result<Vec<VersionMetadata>, CatalogError> {
        Ok(self.versions.clone())
    }
}

/// Catalog re-read from a JSON file on every call, so updates made by the
/// training service show up without a restart. A missing file is empty.
#[derive(Debug, Clone)]
pub struct FileVersionCatalog {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped { versions: Vec<VersionMetadata> },
    Bare(Vec<VersionMetadata>),
}

impl FileVersionCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl VersionCatalog for FileVersionCatalog {
    fn versions(&self) -> Result<Vec<VersionMetadata>, CatalogError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("version catalog missing (path={})", self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        let versions = match serde_json::from_str(&contents)? {
            CatalogDocument::Wrapped { versions } | CatalogDocument::Bare(versions) => versions,
        };
        Ok(versions)
    }
}
