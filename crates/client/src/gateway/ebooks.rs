//! Catalog, review and favorite operations.

use libris_core::{
    Ebook, EbookId, EbookUpdate, EbookUpload, NewReview, Review, SortOrder,
};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use super::Gateway;
use crate::error::GatewayError;

/// Filters for `GET /ebooks`.
///
/// A blank search term is dropped so it behaves exactly like no term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub sort_by: Option<SortOrder>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl CatalogQuery {
    /// A query for `term` with backend defaults for everything else.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            pairs.push(("search", term.to_owned()));
        }
        if let Some(sort) = self.sort_by {
            pairs.push(("sort_by", sort.as_str().to_owned()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

impl Gateway {
    /// `GET /ebooks`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_ebooks(&self, query: &CatalogQuery) -> Result<Vec<Ebook>, GatewayError> {
        let mut url = self.endpoint(&["ebooks"])?;
        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Self::send_json(self.request(Method::GET, url).await).await
    }

    /// `GET /ebooks/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(ebook_id = %id))]
    pub async fn get_ebook(&self, id: EbookId) -> Result<Ebook, GatewayError> {
        let url = self.endpoint(&["ebooks", &id.to_string()])?;
        Self::send_json(self.request(Method::GET, url).await).await
    }

    /// `POST /ebooks/` as multipart form data.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or an attachment carries an
    /// unparseable content type.
    #[instrument(skip(self, upload), fields(title = %upload.title))]
    pub async fn create_ebook(&self, upload: EbookUpload) -> Result<Ebook, GatewayError> {
        let url = self.endpoint(&["ebooks", ""])?;

        let mut form = Form::new()
            .text("title", upload.title)
            .text("author", upload.author);
        if let Some(description) = upload.description {
            form = form.text("description", description);
        }
        if let Some(year) = upload.publication_year {
            form = form.text("publication_year", year.to_string());
        }
        form = form
            .part("pdf_file", file_part(upload.pdf_file)?)
            .part("cover_image", file_part(upload.cover_image)?);

        Self::send_json(self.request(Method::POST, url).await.multipart(form)).await
    }

    /// `PUT /ebooks/{id}` with the changed metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update), fields(ebook_id = %id))]
    pub async fn update_ebook(
        &self,
        id: EbookId,
        update: &EbookUpdate,
    ) -> Result<Ebook, GatewayError> {
        let url = self.endpoint(&["ebooks", &id.to_string()])?;
        Self::send_json(self.request(Method::PUT, url).await.json(update)).await
    }

    /// `DELETE /ebooks/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(ebook_id = %id))]
    pub async fn delete_ebook(&self, id: EbookId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["ebooks", &id.to_string()])?;
        Self::send_empty(self.request(Method::DELETE, url).await).await
    }

    /// `GET /ebooks/{id}/reviews`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(ebook_id = %id))]
    pub async fn list_reviews(&self, id: EbookId) -> Result<Vec<Review>, GatewayError> {
        let url = self.endpoint(&["ebooks", &id.to_string(), "reviews"])?;
        Self::send_json(self.request(Method::GET, url).await).await
    }

    /// `POST /ebooks/{id}/reviews`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, review), fields(ebook_id = %id, rating = %review.rating))]
    pub async fn submit_review(
        &self,
        id: EbookId,
        review: &NewReview,
    ) -> Result<Review, GatewayError> {
        let url = self.endpoint(&["ebooks", &id.to_string(), "reviews"])?;
        Self::send_json(self.request(Method::POST, url).await.json(review)).await
    }

    /// `POST /ebooks/{id}/favorite`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(ebook_id = %id))]
    pub async fn add_favorite(&self, id: EbookId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["ebooks", &id.to_string(), "favorite"])?;
        Self::send_empty(self.request(Method::POST, url).await).await
    }

    /// `DELETE /ebooks/{id}/favorite`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(ebook_id = %id))]
    pub async fn remove_favorite(&self, id: EbookId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["ebooks", &id.to_string(), "favorite"])?;
        Self::send_empty(self.request(Method::DELETE, url).await).await
    }
}

fn file_part(attachment: libris_core::Attachment) -> Result<Part, GatewayError> {
    let part = Part::bytes(attachment.bytes).file_name(attachment.filename);
    match attachment.content_type {
        Some(content_type) => Ok(part.mime_str(&content_type)?),
        None => Ok(part),
    }
}
