//! Implements `WorkbookStore` against the cloud drive's REST API.

use crate::api::{TokenProvider, WorkbookCache, WorkbookStore, XLSX_EXTENSION, XLSX_MIME};
use crate::Result;
use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::{debug, trace};

const GRAPH_ROOT: &str = "https://graph.microsoft.com/v1.0";

/// The configured workbook name was not present in the drive folder listing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileNotFound {
    name: String,
    folder: String,
}

impl Display for FileNotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The file '{}' was not found in the drive folder '{}'",
            self.name, self.folder
        )
    }
}

impl std::error::Error for FileNotFound {}

/// One entry of the folder listing's `value` array. The endpoint returns more fields; only these
/// two matter here.
#[derive(Debug, Clone, Deserialize)]
struct FileDescriptor {
    name: String,
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    value: Vec<FileDescriptor>,
}

/// Fetches and replaces the workbook through the drive's file endpoints, with downloads memoized
/// in a [`WorkbookCache`].
pub struct RemoteDrive {
    token_provider: TokenProvider,
    http: reqwest::Client,
    folder: String,
    workbook_name: String,
    cache: WorkbookCache,
    /// Resolved on first use; the listing is not consulted again within a session.
    file_id: Option<String>,
}

impl RemoteDrive {
    pub fn new(
        token_provider: TokenProvider,
        folder: impl Into<String>,
        workbook_name: impl Into<String>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            token_provider,
            http: reqwest::Client::new(),
            folder: folder.into(),
            workbook_name: workbook_name.into(),
            cache: WorkbookCache::new(cache_ttl),
            file_id: None,
        }
    }

    /// Lists the folder and locates the configured workbook by exact name.
    async fn resolve_file_id(&mut self, access_token: &str) -> Result<String> {
        if let Some(id) = &self.file_id {
            return Ok(id.clone());
        }
        let url = format!("{GRAPH_ROOT}/me/drive/root:/{}:/children", self.folder);
        trace!("Listing drive folder at {url}");
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .context("The drive folder listing request failed")?;
        let response = error_for_status(response, "Drive folder listing").await?;
        let listing: ListingResponse = response
            .json()
            .await
            .context("Unable to parse the drive folder listing")?;

        let file = locate_workbook(&listing.value, &self.workbook_name).ok_or_else(|| {
            FileNotFound {
                name: self.workbook_name.clone(),
                folder: self.folder.clone(),
            }
        })?;
        debug!("Resolved '{}' to file id {}", file.name, file.id);
        self.file_id = Some(file.id.clone());
        Ok(file.id.clone())
    }
}

#[async_trait::async_trait]
impl WorkbookStore for RemoteDrive {
    async fn fetch(&mut self) -> Result<Vec<u8>> {
        let access_token = self.token_provider.token_with_refresh().await?;
        let file_id = self.resolve_file_id(&access_token).await?;

        if let Some(bytes) = self.cache.get(&access_token, &file_id) {
            debug!("Workbook download served from cache");
            return Ok(bytes);
        }

        let url = format!("{GRAPH_ROOT}/me/drive/items/{file_id}/content");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&access_token)
            .send()
            .await
            .context("The workbook download request failed")?;
        let response = error_for_status(response, "Workbook download").await?;
        let bytes = response
            .bytes()
            .await
            .context("Unable to read the workbook download body")?
            .to_vec();

        self.cache.put(&access_token, &file_id, bytes.clone());
        Ok(bytes)
    }

    async fn upload(&mut self, bytes: &[u8]) -> Result<()> {
        let access_token = self.token_provider.token_with_refresh().await?;
        let file_id = self.resolve_file_id(&access_token).await?;

        let url = format!("{GRAPH_ROOT}/me/drive/items/{file_id}/content");
        let response = self
            .http
            .put(&url)
            .bearer_auth(&access_token)
            .header(reqwest::header::CONTENT_TYPE, XLSX_MIME)
            .body(bytes.to_vec())
            .send()
            .await
            .context("The workbook upload request failed")?;
        let _ = error_for_status(response, "Workbook upload").await?;

        // The session just changed the file; a memoized download is now stale.
        self.cache.invalidate_file(&file_id);
        Ok(())
    }

    fn invalidate(&mut self) {
        match &self.file_id {
            Some(id) => {
                let id = id.clone();
                self.cache.invalidate_file(&id);
            }
            None => self.cache.clear(),
        }
    }

    fn describe(&self) -> String {
        format!("'{}' in drive folder '{}'", self.workbook_name, self.folder)
    }
}

/// Client-side filter of the listing: spreadsheet files only, then the exact configured name.
fn locate_workbook<'a>(files: &'a [FileDescriptor], name: &str) -> Option<&'a FileDescriptor> {
    files
        .iter()
        .filter(|f| f.name.to_lowercase().ends_with(XLSX_EXTENSION))
        .find(|f| f.name == name)
}

async fn error_for_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    anyhow::bail!("{what} failed with status {status}: {body}")
}
