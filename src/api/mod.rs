//! The remote surface: token refresh and the workbook store.

mod cache;
mod drive;
mod local;
mod oauth;

pub(crate) use cache::WorkbookCache;
pub use drive::{FileNotFound, RemoteDrive};
pub use local::LocalFile;
pub use oauth::{AuthError, TokenProvider};

use crate::{Config, Result};

/// MIME type used when replacing the remote file's content.
pub(crate) const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Only files with this extension are considered when scanning the drive folder.
pub(crate) const XLSX_EXTENSION: &str = ".xlsx";

/// Where the workbook lives. The two variants are a cloud drive folder and a plain local file;
/// everything above this trait is indifferent to which one is in use.
#[async_trait::async_trait]
pub trait WorkbookStore {
    /// Returns the current workbook bytes. The remote variant memoizes this per
    /// (access token, file id) for a short time.
    async fn fetch(&mut self) -> Result<Vec<u8>>;

    /// Replaces the workbook's content wholesale. Implementations must drop any memoized copy of
    /// the file before returning, so the next `fetch` observes the write.
    async fn upload(&mut self, bytes: &[u8]) -> Result<()>;

    /// Drops any memoized copy of the workbook.
    fn invalidate(&mut self);

    /// Human-readable location of the workbook, for log and error messages.
    fn describe(&self) -> String;
}

/// Builds the store the configuration selects: a local file when a local workbook path is set,
/// the remote drive otherwise.
pub async fn store(config: &Config) -> Result<Box<dyn WorkbookStore + Send>> {
    match config.local_workbook() {
        Some(path) => Ok(Box::new(LocalFile::new(path))),
        None => {
            let token_provider = TokenProvider::load(&config.credentials_path()).await?;
            Ok(Box::new(RemoteDrive::new(
                token_provider,
                config.drive_folder(),
                config.workbook_name(),
                config.cache_ttl(),
            )))
        }
    }
}
