//! Command implementations, one module per area.
//!
//! Each command goes through the same controllers as the web pages, so
//! validation, guards and messages match.

pub mod account;
pub mod admin;
pub mod auth;
pub mod books;

use libris_client::controllers::LOAD_FAILED;
use libris_client::{GatewayError, Theme};
use libris_core::Ebook;
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::context::Context;
use crate::error::CliError;

/// One listing line: id, title, author and year.
#[must_use]
pub fn ebook_line(ebook: &Ebook) -> String {
    let author = ebook.author.as_deref().unwrap_or("Unknown author");
    match ebook.publication_year {
        Some(year) => format!("{:>5}  {} by {author} ({year})", ebook.id, ebook.title),
        None => format!("{:>5}  {} by {author}", ebook.id, ebook.title),
    }
}

/// Message for a failed fetch.
pub(crate) fn load_message(e: &GatewayError) -> String {
    tracing::debug!(error = %e, "Load failed");
    e.detail().unwrap_or_else(|| LOAD_FAILED.to_string())
}

pub fn print_ebooks(ebooks: &[Ebook]) {
    if ebooks.is_empty() {
        println!("No e-books found.");
        return;
    }
    for ebook in ebooks {
        println!("{}", ebook_line(ebook));
    }
}

/// Password from the flag or environment, else one line from stdin.
///
/// # Errors
///
/// Returns an I/O error if stdin cannot be read.
pub async fn read_password(given: Option<String>) -> Result<SecretString, CliError> {
    if let Some(password) = given {
        return Ok(SecretString::from(password));
    }
    eprint!("Password: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Flip the stored theme preference.
///
/// # Errors
///
/// Returns an error if local state cannot be written.
pub async fn toggle_theme(ctx: &Context) -> Result<(), CliError> {
    let theme: Theme = Theme::toggle(ctx.session.storage()).await?;
    println!("Theme: {theme}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ebook_line() {
        let ebook: Ebook =
            serde_json::from_str(r#"{"id": 7, "title": "The Hobbit", "author": "J.R.R. Tolkien", "publication_year": 1937}"#)
                .unwrap();
        assert_eq!(ebook_line(&ebook), "    7  The Hobbit by J.R.R. Tolkien (1937)");

        let bare: Ebook = serde_json::from_str(r#"{"id": 12, "title": "Untitled"}"#).unwrap();
        assert_eq!(ebook_line(&bare), "   12  Untitled by Unknown author");
    }

    #[tokio::test]
    async fn test_read_password_prefers_given_value() {
        use secrecy::ExposeSecret;
        let password = read_password(Some("hunter22".to_string())).await.unwrap();
        assert_eq!(password.expose_secret(), "hunter22");
    }
}
