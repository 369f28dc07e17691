//! Implements `WorkbookStore` for a workbook on the local filesystem.
//!
//! This is the variant the configuration selects with `local_workbook_path`, and it is also what
//! the test suite runs against, so no test touches the network.

use crate::api::WorkbookStore;
use crate::Result;
use anyhow::Context;
use std::path::PathBuf;

pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl WorkbookStore for LocalFile {
    async fn fetch(&mut self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Unable to read the workbook at {}", self.path.display()))
    }

    async fn upload(&mut self, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(&self.path, bytes)
            .await
            .with_context(|| format!("Unable to write the workbook at {}", self.path.display()))
    }

    fn invalidate(&mut self) {
        // Nothing is memoized; every fetch reads the file.
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_then_fetch_round_trip_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Tracking.xlsx");
        let mut store = LocalFile::new(&path);

        let bytes: Vec<u8> = (0u16..600).map(|b| (b % 251) as u8).collect();
        store.upload(&bytes).await.unwrap();
        let fetched = store.fetch().await.unwrap();
        assert_eq!(bytes, fetched);
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let mut store = LocalFile::new(dir.path().join("nope.xlsx"));
        let err = store.fetch().await.unwrap_err();
        assert!(format!("{err:#}").contains("nope.xlsx"));
    }
}
