//! Reference dataset stored on disk.

use async_trait::async_trait;
use health_census_core::models::ReferenceDataset;
use health_census_core::reference::{FetchError, FetchResult, ReferenceSource};
use std::path::{Path, PathBuf};

/// Reads the dataset document from a file on every fetch.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReferenceSource for FileSource {
    async fn fetch(&self) -> FetchResult<ReferenceDataset> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::Io(format!("{}: {}", self.path.display(), e)))?;
        Ok(ReferenceDataset::from_json(&contents)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
