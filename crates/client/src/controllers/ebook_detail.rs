//! E-book detail page: metadata, reviews, review form, download and read.

use libris_core::validation::require;
use libris_core::{Ebook, EbookId, NewReview, Rating, Review};
use tracing::info;
use url::Url;

use super::{Navigation, Notice, SubmitError};
use crate::error::GatewayError;
use crate::gateway::{Download, Gateway};
use crate::resource::Resource;
use crate::routes::Route;

/// Everything the detail page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbookDetail {
    pub ebook: Ebook,
    /// Newest first.
    pub reviews: Vec<Review>,
}

/// Raw review form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewForm {
    pub rating: i64,
    pub comment: String,
}

impl ReviewForm {
    /// The comment is sent exactly as typed.
    ///
    /// # Errors
    ///
    /// Returns a [`libris_core::ValidationError`] for a blank comment or a
    /// rating outside `1..=5`.
    pub fn validate(&self) -> Result<NewReview, libris_core::ValidationError> {
        let rating = Rating::new(self.rating)?;
        require("comment", &self.comment)?;
        Ok(NewReview {
            rating,
            comment: self.comment.clone(),
        })
    }
}

/// Result of asking for a download.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Not signed in; nothing was requested.
    Redirect(Navigation),
    File(Download),
}

#[derive(Debug)]
pub struct EbookDetailController {
    gateway: Gateway,
    id: EbookId,
    detail: Resource<EbookDetail, GatewayError>,
}

impl EbookDetailController {
    #[must_use]
    pub const fn new(gateway: Gateway, id: EbookId) -> Self {
        Self {
            gateway,
            id,
            detail: Resource::Idle,
        }
    }

    #[must_use]
    pub const fn id(&self) -> EbookId {
        self.id
    }

    #[must_use]
    pub const fn detail(&self) -> &Resource<EbookDetail, GatewayError> {
        &self.detail
    }

    /// Take ownership of the loaded state.
    #[must_use]
    pub fn into_detail(self) -> Resource<EbookDetail, GatewayError> {
        self.detail
    }

    /// Fetch the e-book and its reviews concurrently. Either failing fails
    /// the whole load.
    pub async fn load(&mut self) -> &Resource<EbookDetail, GatewayError> {
        self.detail = Resource::Loading;
        let result = tokio::try_join!(
            self.gateway.get_ebook(self.id),
            self.gateway.list_reviews(self.id)
        );
        self.detail = result
            .map(|(ebook, reviews)| EbookDetail { ebook, reviews })
            .into();
        &self.detail
    }

    /// Validate and post a review. On success the new review is placed at the
    /// top of the loaded list.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] without contacting the backend when
    /// the form is incomplete, or the gateway error if posting fails.
    pub async fn submit_review(&mut self, form: &ReviewForm) -> Result<Review, SubmitError> {
        let review = form.validate()?;
        let created = self.gateway.submit_review(self.id, &review).await?;
        if let Some(detail) = self.detail.ready_mut() {
            detail.reviews.insert(0, created.clone());
        }
        info!(ebook_id = %self.id, rating = %created.rating, "Review added");
        Ok(created)
    }

    /// Download the e-book, or redirect to login when signed out.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the download fails.
    pub async fn download(&self) -> Result<DownloadOutcome, GatewayError> {
        if !self.gateway.session().snapshot().await.is_authenticated() {
            return Ok(DownloadOutcome::Redirect(Navigation::with_notice(
                Route::Login,
                Notice::LoginRequiredForDownload,
            )));
        }

        let filename = match self.detail.ready() {
            Some(detail) => detail.ebook.download_filename(),
            None => self.gateway.get_ebook(self.id).await?.download_filename(),
        };
        let file = self.gateway.download(self.id, filename).await?;
        Ok(DownloadOutcome::File(file))
    }

    /// Address of the in-browser reader.
    ///
    /// # Errors
    ///
    /// Returns an error only if the base address cannot carry paths.
    pub fn read_url(&self) -> Result<Url, GatewayError> {
        self.gateway.read_url(self.id)
    }
}
