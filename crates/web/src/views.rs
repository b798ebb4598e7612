//! View models shared by the page templates.

use libris_client::Theme;
use libris_core::{ActivityLog, Ebook, EbookId, Review, UserProfile};

/// Header and body chrome every page renders.
#[derive(Debug, Clone)]
pub struct Layout {
    pub is_authenticated: bool,
    pub is_admin: bool,
    /// Email of the signed-in user.
    pub subject: Option<String>,
    pub theme: Theme,
    /// One-off message carried by a redirect.
    pub notice: Option<&'static str>,
}

/// An e-book as shown in listings and on the detail page.
#[derive(Debug, Clone)]
pub struct EbookCard {
    pub id: EbookId,
    pub title: String,
    pub author: String,
    pub description: String,
    pub year: Option<i32>,
    pub cover_url: String,
    pub categories: Vec<String>,
}

impl EbookCard {
    #[must_use]
    pub fn new(ebook: &Ebook, api_base_url: &str) -> Self {
        Self {
            id: ebook.id,
            title: ebook.title.clone(),
            author: ebook
                .author
                .clone()
                .unwrap_or_else(|| "Unknown author".to_string()),
            description: ebook.description.clone().unwrap_or_default(),
            year: ebook.publication_year,
            cover_url: ebook.cover_url(api_base_url),
            categories: ebook.categories.iter().map(|c| c.name.clone()).collect(),
        }
    }

    #[must_use]
    pub fn list(ebooks: &[Ebook], api_base_url: &str) -> Vec<Self> {
        ebooks.iter().map(|e| Self::new(e, api_base_url)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ReviewView {
    pub rating: u8,
    pub comment: String,
    pub author: String,
    pub timestamp: String,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            rating: review.rating.get(),
            comment: review.comment.clone().unwrap_or_default(),
            author: review.user.name.clone(),
            timestamp: review.timestamp.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivityView {
    pub action: String,
    pub ebook_id: EbookId,
    pub title: String,
    pub timestamp: String,
}

impl From<&ActivityLog> for ActivityView {
    fn from(entry: &ActivityLog) -> Self {
        Self {
            action: entry.action.clone(),
            ebook_id: entry.ebook.id,
            title: entry.ebook.title.clone(),
            timestamp: entry.timestamp.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&UserProfile> for ProfileView {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            role: profile.role.to_string(),
        }
    }
}
