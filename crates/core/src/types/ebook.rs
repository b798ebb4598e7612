//! Catalog entities.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, EbookId};

/// Shown when an e-book has no cover image.
pub const PLACEHOLDER_COVER_URL: &str = "https://via.placeholder.com/300x400.png?text=No+Cover";

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A single e-book record as known to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ebook {
    pub id: EbookId,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    /// Path of the cover image relative to the backend base address.
    #[serde(default)]
    pub cover_image_path: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Ebook {
    /// Absolute cover URL given the backend base address, or the placeholder.
    #[must_use]
    pub fn cover_url(&self, base_url: &str) -> String {
        match self.cover_image_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            _ => PLACEHOLDER_COVER_URL.to_owned(),
        }
    }

    /// Suggested filename for a downloaded copy: `<title>.pdf`.
    ///
    /// Path separators and control characters are replaced so the name is
    /// always a single path component.
    #[must_use]
    pub fn download_filename(&self) -> String {
        let stem: String = self
            .title
            .trim()
            .chars()
            .map(|c| {
                if matches!(c, '/' | '\\' | ':' | '\0') || c.is_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        let stem = stem.trim_matches('.');
        if stem.is_empty() {
            format!("ebook-{}.pdf", self.id)
        } else {
            format!("{stem}.pdf")
        }
    }
}

/// Sort orders accepted by the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Newest,
    Popular,
    Rating,
}

impl SortOrder {
    /// Parse a sort order from a query value; unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" => Some(Self::Newest),
            "popular" => Some(Self::Popular),
            "rating" => Some(Self::Rating),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Popular => "popular",
            Self::Rating => "rating",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata changes sent with `PUT /ebooks/{id}`. Absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbookUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
}

/// An uploaded file held in memory until it is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes,
        }
    }

    /// `true` when no file was actually chosen (browsers send an empty part).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.filename.trim().is_empty()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A new catalog entry: metadata plus the content file and cover image.
#[derive(Debug, Clone)]
pub struct EbookUpload {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    pub pdf_file: Attachment,
    pub cover_image: Attachment,
}
