//! Administrator pages: dashboard, catalog management, upload and edit.

use libris_core::validation::{optional, publication_year, require};
use libris_core::{
    Attachment, DashboardSummary, Ebook, EbookId, EbookUpdate, EbookUpload, ValidationError,
};
use tracing::info;

use super::{Navigation, Notice, SubmitError};
use crate::error::GatewayError;
use crate::gateway::{CatalogQuery, Gateway};
use crate::resource::Resource;
use crate::routes::Route;

/// `/admin/dashboard`.
#[derive(Debug)]
pub struct DashboardController {
    gateway: Gateway,
    summary: Resource<DashboardSummary, GatewayError>,
}

impl DashboardController {
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            summary: Resource::Idle,
        }
    }

    #[must_use]
    pub const fn summary(&self) -> &Resource<DashboardSummary, GatewayError> {
        &self.summary
    }

    #[must_use]
    pub fn into_summary(self) -> Resource<DashboardSummary, GatewayError> {
        self.summary
    }

    pub async fn load(&mut self) -> &Resource<DashboardSummary, GatewayError> {
        self.summary = Resource::Loading;
        self.summary = self.gateway.dashboard_summary().await.into();
        &self.summary
    }
}

/// `/admin/ebooks`: the full catalog with delete buttons.
#[derive(Debug)]
pub struct ManageController {
    gateway: Gateway,
    ebooks: Resource<Vec<Ebook>, GatewayError>,
}

impl ManageController {
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            ebooks: Resource::Idle,
        }
    }

    #[must_use]
    pub const fn ebooks(&self) -> &Resource<Vec<Ebook>, GatewayError> {
        &self.ebooks
    }

    #[must_use]
    pub fn into_ebooks(self) -> Resource<Vec<Ebook>, GatewayError> {
        self.ebooks
    }

    pub async fn load(&mut self) -> &Resource<Vec<Ebook>, GatewayError> {
        self.ebooks = Resource::Loading;
        self.ebooks = self
            .gateway
            .list_ebooks(&CatalogQuery::default())
            .await
            .into();
        &self.ebooks
    }

    /// Delete an e-book and drop it from the loaded list. The list is left
    /// untouched when the backend refuses.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if deletion fails.
    pub async fn delete(&mut self, id: EbookId) -> Result<(), GatewayError> {
        self.gateway.delete_ebook(id).await?;
        if let Some(ebooks) = self.ebooks.ready_mut() {
            ebooks.retain(|book| book.id != id);
        }
        info!(ebook_id = %id, "E-book deleted");
        Ok(())
    }
}

/// Raw upload form input. Files are `None` when no file was chosen.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub title: String,
    pub author: String,
    pub description: String,
    pub publication_year: String,
    pub pdf_file: Option<Attachment>,
    pub cover_image: Option<Attachment>,
}

impl UploadForm {
    /// Title, author, content file and cover are required.
    ///
    /// # Errors
    ///
    /// Returns the first missing or malformed field.
    pub fn validate(self) -> Result<EbookUpload, ValidationError> {
        let title = require("title", &self.title)?.to_owned();
        let author = require("author", &self.author)?.to_owned();
        let publication_year = publication_year(&self.publication_year)?;
        let pdf_file = self
            .pdf_file
            .filter(|file| !file.is_empty())
            .ok_or(ValidationError::MissingField("PDF file"))?;
        let cover_image = self
            .cover_image
            .filter(|file| !file.is_empty())
            .ok_or(ValidationError::MissingField("cover image"))?;

        Ok(EbookUpload {
            title,
            author,
            description: optional(&self.description),
            publication_year,
            pdf_file,
            cover_image,
        })
    }
}

/// Validate and upload a new e-book, then return to the management list.
///
/// # Errors
///
/// Returns [`SubmitError::Invalid`] without contacting the backend when the
/// form is incomplete.
pub async fn submit_upload(gateway: &Gateway, form: UploadForm) -> Result<Navigation, SubmitError> {
    let upload = form.validate()?;
    let created = gateway.create_ebook(upload).await?;
    info!(ebook_id = %created.id, title = %created.title, "E-book uploaded");
    Ok(Navigation::with_notice(Route::AdminEbooks, Notice::EbookCreated))
}

/// Raw edit form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub title: String,
    pub author: String,
    pub description: String,
    pub publication_year: String,
}

impl EditForm {
    /// Prefill from the current record.
    #[must_use]
    pub fn from_ebook(ebook: &Ebook) -> Self {
        Self {
            title: ebook.title.clone(),
            author: ebook.author.clone().unwrap_or_default(),
            description: ebook.description.clone().unwrap_or_default(),
            publication_year: ebook
                .publication_year
                .map(|y| y.to_string())
                .unwrap_or_default(),
        }
    }

    /// Title and author are required. The description is always sent as
    /// typed, so clearing it clears the record; a blank year is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first missing or malformed field.
    pub fn validate(&self) -> Result<EbookUpdate, ValidationError> {
        Ok(EbookUpdate {
            title: Some(require("title", &self.title)?.to_owned()),
            author: Some(require("author", &self.author)?.to_owned()),
            description: Some(self.description.clone()),
            publication_year: publication_year(&self.publication_year)?,
        })
    }
}

/// `/admin/ebooks/edit/{id}`.
#[derive(Debug)]
pub struct EditController {
    gateway: Gateway,
    id: EbookId,
    ebook: Resource<Ebook, GatewayError>,
}

impl EditController {
    #[must_use]
    pub const fn new(gateway: Gateway, id: EbookId) -> Self {
        Self {
            gateway,
            id,
            ebook: Resource::Idle,
        }
    }

    #[must_use]
    pub const fn ebook(&self) -> &Resource<Ebook, GatewayError> {
        &self.ebook
    }

    #[must_use]
    pub fn into_ebook(self) -> Resource<Ebook, GatewayError> {
        self.ebook
    }

    pub async fn load(&mut self) -> &Resource<Ebook, GatewayError> {
        self.ebook = Resource::Loading;
        self.ebook = self.gateway.get_ebook(self.id).await.into();
        &self.ebook
    }

    /// Validate and save, then return to the management list.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] without contacting the backend when
    /// the form is incomplete.
    pub async fn submit(&mut self, form: &EditForm) -> Result<Navigation, SubmitError> {
        let update = form.validate()?;
        let updated = self.gateway.update_ebook(self.id, &update).await?;
        info!(ebook_id = %updated.id, "E-book updated");
        self.ebook = Resource::Ready(updated);
        Ok(Navigation::with_notice(Route::AdminEbooks, Notice::EbookUpdated))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pdf() -> Attachment {
        Attachment::new("book.pdf", Some("application/pdf".to_owned()), b"%PDF".to_vec())
    }

    fn cover() -> Attachment {
        Attachment::new("cover.png", Some("image/png".to_owned()), vec![0x89, b'P'])
    }

    fn complete_upload() -> UploadForm {
        UploadForm {
            title: "Bumi Manusia".to_owned(),
            author: "Pramoedya Ananta Toer".to_owned(),
            description: String::new(),
            publication_year: "1980".to_owned(),
            pdf_file: Some(pdf()),
            cover_image: Some(cover()),
        }
    }

    #[test]
    fn test_upload_validates() {
        let upload = complete_upload().validate().unwrap();
        assert_eq!(upload.title, "Bumi Manusia");
        assert_eq!(upload.description, None);
        assert_eq!(upload.publication_year, Some(1980));
    }

    #[test]
    fn test_upload_requires_files() {
        let form = UploadForm {
            pdf_file: None,
            ..complete_upload()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::MissingField("PDF file")
        );

        let form = UploadForm {
            cover_image: Some(Attachment::new("", None, Vec::new())),
            ..complete_upload()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::MissingField("cover image")
        );
    }

    #[test]
    fn test_upload_requires_author() {
        let form = UploadForm {
            author: " ".to_owned(),
            ..complete_upload()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::MissingField("author")
        );
    }

    #[test]
    fn test_edit_form_roundtrips_record() {
        let ebook = Ebook {
            id: EbookId::new(5),
            title: "Dune".to_owned(),
            author: Some("Frank Herbert".to_owned()),
            description: None,
            publication_year: Some(1965),
            cover_image_path: None,
            categories: Vec::new(),
        };
        let update = EditForm::from_ebook(&ebook).validate().unwrap();
        assert_eq!(update.title.as_deref(), Some("Dune"));
        assert_eq!(update.author.as_deref(), Some("Frank Herbert"));
        assert_eq!(update.description.as_deref(), Some(""));
        assert_eq!(update.publication_year, Some(1965));
    }

    #[test]
    fn test_edit_form_sends_cleared_description() {
        let form = EditForm {
            title: "T".to_owned(),
            author: "A".to_owned(),
            description: String::new(),
            publication_year: String::new(),
        };
        let body = serde_json::to_value(form.validate().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"title": "T", "author": "A", "description": ""})
        );
    }

    #[test]
    fn test_edit_form_requires_author() {
        let form = EditForm {
            title: "Dune".to_owned(),
            author: "  ".to_owned(),
            ..EditForm::default()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::MissingField("author")
        );
    }

    #[test]
    fn test_edit_form_requires_title() {
        let form = EditForm::default();
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::MissingField("title")
        );
    }
}
