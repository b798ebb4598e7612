//! `admin` subcommands. All of them need an administrator account.

use std::path::Path;

use libris_client::Resource;
use libris_client::controllers::admin::{
    DashboardController, EditController, EditForm, ManageController, UploadForm, submit_upload,
};
use libris_core::{Attachment, EbookId};

use super::{load_message, print_ebooks};
use crate::context::Context;
use crate::error::CliError;

const UPLOAD_FAILED: &str = "Could not upload the e-book.";
const UPDATE_FAILED: &str = "Could not save the changes.";

/// Print the dashboard summary and the latest registrations and uploads.
pub async fn stats(ctx: &Context) -> Result<(), CliError> {
    ctx.require_elevated()?;
    let mut dashboard = DashboardController::new(ctx.gateway.clone());
    let summary = match dashboard.load().await {
        Resource::Ready(summary) => summary,
        Resource::Failed(e) => return Err(CliError::Rejected(load_message(e))),
        Resource::Idle | Resource::Loading => return Ok(()),
    };

    println!("Registered users: {}", summary.total_users);
    println!("\nMost active users");
    for stat in &summary.top_active_users {
        println!("  {:>4}  {} <{}>", stat.activity_count, stat.user.name, stat.user.email);
    }
    println!("\nMost downloaded");
    for stat in &summary.most_downloaded_ebooks {
        println!("  {:>4}  {}", stat.download_count, stat.ebook.title);
    }

    let panel = ctx.gateway.monitoring_panel().await?;
    println!("\nLatest users");
    for user in &panel.latest_users {
        println!("  {} <{}>", user.name, user.email);
    }
    println!("\nLatest uploads");
    print_ebooks(&panel.latest_ebooks);
    Ok(())
}

/// Fields for `admin create`.
pub struct NewEbook<'a> {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub year: Option<i32>,
    pub pdf: &'a Path,
    pub cover: &'a Path,
}

/// Media type guessed from the file extension.
fn content_type_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media = match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => return None,
    };
    Some(media.to_string())
}

async fn attachment(path: &Path) -> Result<Attachment, CliError> {
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Attachment::new(filename, content_type_for(path), bytes))
}

pub async fn create(ctx: &Context, input: NewEbook<'_>) -> Result<(), CliError> {
    ctx.require_elevated()?;
    let form = UploadForm {
        title: input.title,
        author: input.author,
        description: input.description.unwrap_or_default(),
        publication_year: input.year.map(|y| y.to_string()).unwrap_or_default(),
        pdf_file: Some(attachment(input.pdf).await?),
        cover_image: Some(attachment(input.cover).await?),
    };
    let nav = submit_upload(&ctx.gateway, form)
        .await
        .map_err(|e| CliError::rejected(&e, UPLOAD_FAILED))?;
    if let Some(notice) = nav.notice {
        println!("{notice}");
    }
    Ok(())
}

/// Changes for `admin update`; `None` keeps the current value.
#[derive(Default)]
pub struct Changes {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub year: Option<i32>,
}

impl Changes {
    fn apply(self, form: &mut EditForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(author) = self.author {
            form.author = author;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(year) = self.year {
            form.publication_year = year.to_string();
        }
    }
}

pub async fn update(ctx: &Context, id: EbookId, changes: Changes) -> Result<(), CliError> {
    ctx.require_elevated()?;
    let mut controller = EditController::new(ctx.gateway.clone(), id);
    let mut form = match controller.load().await {
        Resource::Ready(ebook) => EditForm::from_ebook(ebook),
        Resource::Failed(e) => return Err(CliError::Rejected(load_message(e))),
        Resource::Idle | Resource::Loading => return Ok(()),
    };
    changes.apply(&mut form);

    let nav = controller
        .submit(&form)
        .await
        .map_err(|e| CliError::rejected(&e, UPDATE_FAILED))?;
    if let Some(notice) = nav.notice {
        println!("{notice}");
    }
    Ok(())
}

pub async fn delete(ctx: &Context, id: EbookId) -> Result<(), CliError> {
    ctx.require_elevated()?;
    ManageController::new(ctx.gateway.clone()).delete(id).await?;
    println!("Deleted {id}");
    Ok(())
}
