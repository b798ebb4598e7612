//! E-book detail, reviews and downloads.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use libris_client::Resource;
use libris_client::controllers::ebook_detail::{
    DownloadOutcome, EbookDetail, EbookDetailController, ReviewForm,
};
use libris_core::EbookId;
use serde::Deserialize;

use super::load_error;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CurrentSession, RequireAuth};
use crate::state::AppState;
use crate::views::{EbookCard, Layout, ReviewView};

/// Shown after a failed download redirect.
pub const DOWNLOAD_FAILED: &str = "The download failed. Please try again.";

/// Shown when posting a review fails without a backend explanation.
pub const REVIEW_FAILED: &str = "Could not post your review.";

#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewInput {
    #[serde(default = "default_rating")]
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

const fn default_rating() -> i64 {
    5
}

#[derive(Template, WebTemplate)]
#[template(path = "ebook_detail.html")]
pub struct EbookDetailTemplate {
    pub layout: Layout,
    pub ebook: Option<EbookCard>,
    pub reviews: Vec<ReviewView>,
    pub read_url: String,
    pub error: Option<String>,
    pub review_error: Option<String>,
    pub review_posted: bool,
    /// Review form values to show again after a failed post.
    pub rating: i64,
    pub comment: String,
}

impl EbookDetailTemplate {
    fn build(
        state: &AppState,
        current: &CurrentSession,
        controller: &EbookDetailController,
    ) -> Result<Self> {
        let (ebook, reviews, error) = match controller.detail() {
            Resource::Ready(EbookDetail { ebook, reviews }) => (
                Some(EbookCard::new(ebook, state.api_base_url())),
                reviews.iter().map(ReviewView::from).collect(),
                None,
            ),
            Resource::Failed(e) if e.is_not_found() => {
                return Err(AppError::NotFound(format!("ebook {}", controller.id())));
            }
            Resource::Failed(e) => (None, Vec::new(), Some(load_error(e))),
            Resource::Idle | Resource::Loading => (None, Vec::new(), None),
        };

        Ok(Self {
            layout: current.layout(None),
            ebook,
            reviews,
            read_url: controller.read_url()?.to_string(),
            error,
            review_error: None,
            review_posted: false,
            rating: default_rating(),
            comment: String::new(),
        })
    }
}

/// Display an e-book with its reviews.
pub async fn show(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(id): Path<EbookId>,
    Query(params): Query<DetailParams>,
) -> Result<EbookDetailTemplate> {
    let mut controller = EbookDetailController::new(current.gateway().clone(), id);
    controller.load().await;

    let mut page = EbookDetailTemplate::build(&state, &current, &controller)?;
    if params.error.as_deref() == Some("download") && page.error.is_none() {
        page.error = Some(DOWNLOAD_FAILED.to_string());
    }
    Ok(page)
}

/// Post a review and show it at the top of the list.
pub async fn add_review(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<EbookId>,
    Form(input): Form<ReviewInput>,
) -> Result<EbookDetailTemplate> {
    let mut controller = EbookDetailController::new(current.gateway().clone(), id);
    controller.load().await;

    let form = ReviewForm {
        rating: input.rating,
        comment: input.comment,
    };
    let outcome = controller.submit_review(&form).await;

    let mut page = EbookDetailTemplate::build(&state, &current, &controller)?;
    match outcome {
        Ok(_) => page.review_posted = true,
        Err(e) => {
            tracing::warn!(ebook_id = %id, error = %e, "Review rejected");
            page.review_error = Some(e.user_message(REVIEW_FAILED));
            page.rating = form.rating;
            page.comment = form.comment;
        }
    }
    Ok(page)
}

/// Stream the e-book file to the browser.
///
/// Signed-out visitors are sent to the login page with a notice; no backend
/// request is made for them.
pub async fn download(current: CurrentSession, Path(id): Path<EbookId>) -> Response {
    let controller = EbookDetailController::new(current.gateway().clone(), id);
    match controller.download().await {
        Ok(DownloadOutcome::Redirect(nav)) => Redirect::to(&nav.href()).into_response(),
        Ok(DownloadOutcome::File(file)) => {
            let content_type = file
                .content_type
                .clone()
                .unwrap_or_else(|| "application/pdf".to_string());
            let disposition = format!(
                "attachment; filename*=UTF-8''{}",
                urlencoding::encode(&file.filename)
            );
            (
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                file.bytes,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(ebook_id = %id, error = %e, "Download failed");
            Redirect::to(&format!("/ebook/{id}?error=download")).into_response()
        }
    }
}
