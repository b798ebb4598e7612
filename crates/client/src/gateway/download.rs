//! Binary downloads and reader links.

use std::fmt;
use std::path::{Path, PathBuf};

use libris_core::EbookId;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use super::Gateway;
use crate::error::GatewayError;

/// A downloaded file held in memory until it is handed to a sink.
#[derive(Clone, PartialEq, Eq)]
pub struct Download {
    /// Suggested file name, a single path component.
    pub filename: String,
    /// `Content-Type` reported by the backend.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Download")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Download {
    /// Write the file into `dir` under its suggested name.
    ///
    /// The bytes land in a hidden `.part` file first, which is renamed into
    /// place once fully written. Returns the final path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory is not writable.
    pub async fn save_in(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let target = dir.join(&self.filename);
        let partial = dir.join(format!(".{}.part", self.filename));
        if let Err(e) = tokio::fs::write(&partial, &self.bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, &target).await?;
        Ok(target)
    }
}

impl Gateway {
    /// `GET /ebooks/{id}/download`.
    ///
    /// The backend records the download against the signed-in account, so
    /// this requires a credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, filename), fields(ebook_id = %id))]
    pub async fn download(
        &self,
        id: EbookId,
        filename: impl Into<String>,
    ) -> Result<Download, GatewayError> {
        let url = self.endpoint(&["ebooks", &id.to_string(), "download"])?;
        let response = Self::send(self.request(Method::GET, url).await).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?.to_vec();
        debug!(len = bytes.len(), "Download complete");

        Ok(Download {
            filename: filename.into(),
            content_type,
            bytes,
        })
    }

    /// Address of the in-browser reader for `id`. No request is made.
    ///
    /// # Errors
    ///
    /// Returns an error only if the base address cannot carry paths.
    pub fn read_url(&self, id: EbookId) -> Result<Url, GatewayError> {
        self.endpoint(&["ebooks", &id.to_string(), "read"])
    }
}
