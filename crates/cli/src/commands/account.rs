//! `profile`, `history`, `favorites`.

use libris_client::Resource;
use libris_client::controllers::profile::ProfileController;

use super::{load_message, print_ebooks};
use crate::context::Context;
use crate::error::CliError;

pub async fn profile(ctx: &Context) -> Result<(), CliError> {
    ctx.require_authenticated()?;
    let mut controller = ProfileController::new(ctx.gateway.clone());
    match controller.load().await {
        Resource::Ready(page) => {
            println!("Name:  {}", page.profile.name);
            println!("Email: {}", page.profile.email);
            println!("Role:  {}", page.profile.role);
            println!("Recent activity: {} entries", page.history.len());
            Ok(())
        }
        Resource::Failed(e) => Err(CliError::Rejected(load_message(e))),
        Resource::Idle | Resource::Loading => Ok(()),
    }
}

pub async fn history(ctx: &Context) -> Result<(), CliError> {
    ctx.require_authenticated()?;
    let history = ctx.gateway.history().await?;
    if history.is_empty() {
        println!("No activity yet.");
    }
    for entry in &history {
        println!(
            "{}  {:<10} {} ({})",
            entry.timestamp, entry.action, entry.ebook.title, entry.ebook.id
        );
    }
    Ok(())
}

pub async fn favorites(ctx: &Context) -> Result<(), CliError> {
    ctx.require_authenticated()?;
    print_ebooks(&ctx.gateway.favorites().await?);
    Ok(())
}
