//! `books` subcommands: the catalog and the detail view.

use std::path::Path;

use libris_client::controllers::ebook_detail::{
    DownloadOutcome, EbookDetailController, ReviewForm,
};
use libris_client::controllers::catalog::CatalogController;
use libris_client::{CatalogQuery, Resource};
use libris_core::{EbookId, SortOrder};

use super::{load_message, print_ebooks};
use crate::context::Context;
use crate::error::CliError;

const REVIEW_FAILED: &str = "Could not post your review.";

pub async fn list(
    ctx: &Context,
    search: Option<String>,
    sort_by: Option<SortOrder>,
    skip: Option<u32>,
    limit: Option<u32>,
) -> Result<(), CliError> {
    let mut catalog = CatalogController::new(ctx.gateway.clone());
    let query = CatalogQuery {
        search,
        sort_by,
        skip,
        limit,
    };
    match catalog.load(query).await {
        Resource::Ready(ebooks) => {
            print_ebooks(ebooks);
            Ok(())
        }
        Resource::Failed(e) => Err(CliError::Rejected(load_message(e))),
        Resource::Idle | Resource::Loading => Ok(()),
    }
}

pub async fn show(ctx: &Context, id: EbookId) -> Result<(), CliError> {
    let mut controller = EbookDetailController::new(ctx.gateway.clone(), id);
    let detail = match controller.load().await {
        Resource::Ready(detail) => detail,
        Resource::Failed(e) => return Err(CliError::Rejected(load_message(e))),
        Resource::Idle | Resource::Loading => return Ok(()),
    };

    let ebook = &detail.ebook;
    println!("{}", ebook.title);
    println!("by {}", ebook.author.as_deref().unwrap_or("Unknown author"));
    if let Some(year) = ebook.publication_year {
        println!("Published {year}");
    }
    if !ebook.categories.is_empty() {
        let names: Vec<_> = ebook.categories.iter().map(|c| c.name.as_str()).collect();
        println!("Categories: {}", names.join(", "));
    }
    if let Some(description) = &ebook.description {
        println!("\n{description}");
    }

    println!("\nReviews ({})", detail.reviews.len());
    for review in &detail.reviews {
        println!(
            "  {}/5  {}  {}",
            review.rating, review.user.name, review.timestamp
        );
        if let Some(comment) = &review.comment {
            println!("        {comment}");
        }
    }
    Ok(())
}

/// Save the e-book into `dir`.
pub async fn download(ctx: &Context, id: EbookId, dir: &Path) -> Result<(), CliError> {
    let controller = EbookDetailController::new(ctx.gateway.clone(), id);
    match controller.download().await? {
        DownloadOutcome::Redirect(nav) => {
            if let Some(notice) = nav.notice {
                eprintln!("{notice}");
            }
            Err(CliError::NotSignedIn)
        }
        DownloadOutcome::File(file) => {
            let path = file.save_in(dir).await?;
            println!("Saved {}", path.display());
            Ok(())
        }
    }
}

/// Print the in-browser reader address.
pub fn read(ctx: &Context, id: EbookId) -> Result<(), CliError> {
    let controller = EbookDetailController::new(ctx.gateway.clone(), id);
    println!("{}", controller.read_url()?);
    Ok(())
}

pub async fn review(
    ctx: &Context,
    id: EbookId,
    rating: i64,
    comment: String,
) -> Result<(), CliError> {
    ctx.require_authenticated()?;
    let mut controller = EbookDetailController::new(ctx.gateway.clone(), id);
    let review = controller
        .submit_review(&ReviewForm { rating, comment })
        .await
        .map_err(|e| CliError::rejected(&e, REVIEW_FAILED))?;
    println!("Review posted ({}/5)", review.rating);
    Ok(())
}

/// Add to or remove from favorites.
pub async fn favorite(ctx: &Context, id: EbookId, remove: bool) -> Result<(), CliError> {
    ctx.require_authenticated()?;
    if remove {
        ctx.gateway.remove_favorite(id).await?;
        println!("Removed {id} from favorites");
    } else {
        ctx.gateway.add_favorite(id).await?;
        println!("Added {id} to favorites");
    }
    Ok(())
}
