//! Administrator pages.
//!
//! Every handler here takes [`RequireAdmin`], so anonymous visitors are sent
//! to the login page and signed-in readers to the catalog before any backend
//! call is made.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    response::{IntoResponse, Redirect, Response},
};
use libris_client::Resource;
use libris_client::controllers::Notice;
use libris_client::controllers::admin::{
    DashboardController, EditController, EditForm, ManageController, UploadForm, submit_upload,
};
use libris_core::{Attachment, EbookId, UserStat};
use serde::Deserialize;

use super::{NoticeQuery, load_error};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;
use crate::views::{EbookCard, Layout};

/// Shown when an upload fails without a backend explanation.
pub const UPLOAD_FAILED: &str = "Could not upload the e-book.";
/// Shown when an edit fails without a backend explanation.
pub const UPDATE_FAILED: &str = "Could not save the changes.";
/// Shown when a delete fails without a backend explanation.
pub const DELETE_FAILED: &str = "Could not delete the e-book.";

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone)]
pub struct TopUserView {
    pub name: String,
    pub email: String,
    pub activity_count: i64,
}

impl From<&UserStat> for TopUserView {
    fn from(stat: &UserStat) -> Self {
        Self {
            name: stat.user.name.clone(),
            email: stat.user.email.clone(),
            activity_count: stat.activity_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadStatView {
    pub id: EbookId,
    pub title: String,
    pub download_count: i64,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub total_users: i64,
    pub top_users: Vec<TopUserView>,
    pub most_downloaded: Vec<DownloadStatView>,
    pub error: Option<String>,
}

/// Display the statistics summary.
pub async fn dashboard(RequireAdmin(current): RequireAdmin) -> DashboardTemplate {
    let mut controller = DashboardController::new(current.gateway().clone());
    let mut page = DashboardTemplate {
        layout: current.layout(None),
        total_users: 0,
        top_users: Vec::new(),
        most_downloaded: Vec::new(),
        error: None,
    };

    match controller.load().await {
        Resource::Ready(summary) => {
            page.total_users = summary.total_users;
            page.top_users = summary.top_active_users.iter().map(TopUserView::from).collect();
            page.most_downloaded = summary
                .most_downloaded_ebooks
                .iter()
                .map(|stat| DownloadStatView {
                    id: stat.ebook.id,
                    title: stat.ebook.title.clone(),
                    download_count: stat.download_count,
                })
                .collect();
        }
        Resource::Failed(e) => page.error = Some(load_error(e)),
        Resource::Idle | Resource::Loading => {}
    }
    page
}

// =============================================================================
// Catalog management
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "admin/ebooks.html")]
pub struct ManageTemplate {
    pub layout: Layout,
    pub ebooks: Vec<EbookCard>,
    pub error: Option<String>,
}

fn manage_page(
    state: &AppState,
    layout: Layout,
    controller: &ManageController,
    error: Option<String>,
) -> ManageTemplate {
    let (ebooks, load_failure) = match controller.ebooks() {
        Resource::Ready(list) => (EbookCard::list(list, state.api_base_url()), None),
        Resource::Failed(e) => (Vec::new(), Some(load_error(e))),
        Resource::Idle | Resource::Loading => (Vec::new(), None),
    };
    ManageTemplate {
        layout,
        ebooks,
        error: error.or(load_failure),
    }
}

/// List every e-book with edit and delete actions.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Query(query): Query<NoticeQuery>,
) -> ManageTemplate {
    let mut controller = ManageController::new(current.gateway().clone());
    controller.load().await;
    manage_page(&state, current.layout(query.notice()), &controller, None)
}

/// Delete an e-book and show the list without it.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(id): Path<EbookId>,
) -> ManageTemplate {
    let mut controller = ManageController::new(current.gateway().clone());
    controller.load().await;

    match controller.delete(id).await {
        Ok(()) => manage_page(
            &state,
            current.layout(Some(Notice::EbookDeleted)),
            &controller,
            None,
        ),
        Err(e) => {
            tracing::warn!(ebook_id = %id, error = %e, "Delete failed");
            let message = e.detail().unwrap_or_else(|| DELETE_FAILED.to_string());
            manage_page(&state, current.layout(None), &controller, Some(message))
        }
    }
}

// =============================================================================
// Upload
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "admin/new.html")]
pub struct NewTemplate {
    pub layout: Layout,
    pub title: String,
    pub author: String,
    pub description: String,
    pub publication_year: String,
    pub error: Option<String>,
}

/// Display the upload form.
pub async fn new_page(RequireAdmin(current): RequireAdmin) -> NewTemplate {
    NewTemplate {
        layout: current.layout(None),
        title: String::new(),
        author: String::new(),
        description: String::new(),
        publication_year: String::new(),
        error: None,
    }
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::BadRequest(format!("invalid upload: {e}"))
}

/// Collect the multipart fields into an upload form. Unknown fields are
/// ignored; an empty file input yields an empty attachment.
async fn read_upload(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pdf_file" | "cover_image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                let attachment = Attachment::new(filename, content_type, bytes.to_vec());
                if name == "pdf_file" {
                    form.pdf_file = Some(attachment);
                } else {
                    form.cover_image = Some(attachment);
                }
            }
            "title" => form.title = field.text().await.map_err(bad_multipart)?,
            "author" => form.author = field.text().await.map_err(bad_multipart)?,
            "description" => form.description = field.text().await.map_err(bad_multipart)?,
            "publication_year" => {
                form.publication_year = field.text().await.map_err(bad_multipart)?;
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Upload a new e-book.
pub async fn create(RequireAdmin(current): RequireAdmin, multipart: Multipart) -> Result<Response> {
    let form = read_upload(multipart).await?;
    let retained = (
        form.title.clone(),
        form.author.clone(),
        form.description.clone(),
        form.publication_year.clone(),
    );

    match submit_upload(current.gateway(), form).await {
        Ok(nav) => Ok(Redirect::to(&nav.href()).into_response()),
        Err(e) => {
            tracing::warn!(error = %e, "Upload rejected");
            let (title, author, description, publication_year) = retained;
            Ok(NewTemplate {
                layout: current.layout(None),
                title,
                author,
                description,
                publication_year,
                error: Some(e.user_message(UPLOAD_FAILED)),
            }
            .into_response())
        }
    }
}

// =============================================================================
// Edit
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "admin/edit.html")]
pub struct EditTemplate {
    pub layout: Layout,
    pub id: EbookId,
    pub form: EditForm,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publication_year: String,
}

impl From<EditInput> for EditForm {
    fn from(input: EditInput) -> Self {
        Self {
            title: input.title,
            author: input.author,
            description: input.description,
            publication_year: input.publication_year,
        }
    }
}

/// Display the edit form prefilled with the current metadata.
pub async fn edit_page(
    RequireAdmin(current): RequireAdmin,
    Path(id): Path<EbookId>,
) -> Result<EditTemplate> {
    let mut controller = EditController::new(current.gateway().clone(), id);
    let (form, error) = match controller.load().await {
        Resource::Ready(ebook) => (EditForm::from_ebook(ebook), None),
        Resource::Failed(e) if e.is_not_found() => {
            return Err(AppError::NotFound(format!("ebook {id}")));
        }
        Resource::Failed(e) => (EditForm::default(), Some(load_error(e))),
        Resource::Idle | Resource::Loading => (EditForm::default(), None),
    };

    Ok(EditTemplate {
        layout: current.layout(None),
        id,
        form,
        error,
    })
}

/// Save metadata changes.
pub async fn update(
    RequireAdmin(current): RequireAdmin,
    Path(id): Path<EbookId>,
    Form(input): Form<EditInput>,
) -> Response {
    let form = EditForm::from(input);
    let mut controller = EditController::new(current.gateway().clone(), id);

    match controller.submit(&form).await {
        Ok(nav) => Redirect::to(&nav.href()).into_response(),
        Err(e) => {
            tracing::warn!(ebook_id = %id, error = %e, "Update rejected");
            EditTemplate {
                layout: current.layout(None),
                id,
                error: Some(e.user_message(UPDATE_FAILED)),
                form,
            }
            .into_response()
        }
    }
}
