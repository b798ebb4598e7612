//! Catalog, detail, reviews and downloads against the stub backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use libris_client::controllers::Notice;
use libris_client::controllers::catalog::CatalogController;
use libris_client::controllers::ebook_detail::{
    DownloadOutcome, EbookDetailController, ReviewForm,
};
use libris_client::controllers::auth::LoginForm;
use libris_client::{CatalogQuery, Gateway, MemoryStorage, Route, Session};
use libris_core::EbookId;
use libris_integration_tests::{READER_EMAIL, READER_NAME, READER_PASSWORD, StubBackend};
use secrecy::SecretString;

async fn signed_in(backend: &StubBackend) -> (Session<MemoryStorage>, Gateway) {
    let session = Session::new(MemoryStorage::new());
    session.restore().await;
    let gateway = backend.gateway().for_session(session.handle());
    LoginForm {
        email: READER_EMAIL.to_string(),
        password: SecretString::from(READER_PASSWORD),
    }
    .submit(&session, &gateway)
    .await
    .unwrap();
    (session, gateway)
}

async fn anonymous(backend: &StubBackend) -> (Session<MemoryStorage>, Gateway) {
    let session = Session::new(MemoryStorage::new());
    session.restore().await;
    let gateway = backend.gateway().for_session(session.handle());
    (session, gateway)
}

fn titles(catalog: &CatalogController) -> Vec<String> {
    catalog
        .ebooks()
        .ready()
        .unwrap()
        .iter()
        .map(|e| e.title.clone())
        .collect()
}

#[tokio::test]
async fn test_search_filters_by_author() {
    let backend = StubBackend::start().await;
    let mut catalog = CatalogController::new(backend.gateway());

    catalog.search("Tolkien").await;
    assert_eq!(titles(&catalog), ["The Hobbit", "The Silmarillion"]);

    catalog.search("").await;
    assert_eq!(titles(&catalog).len(), 3);
}

#[tokio::test]
async fn test_blank_search_sends_no_term() {
    let backend = StubBackend::start().await;
    let mut catalog = CatalogController::new(backend.gateway());
    catalog.load(CatalogQuery::search("   ")).await;
    assert_eq!(titles(&catalog).len(), 3);
}

#[tokio::test]
async fn test_stale_search_response_is_ignored() {
    let backend = StubBackend::start().await;
    let gateway = backend.gateway();
    let mut catalog = CatalogController::new(gateway.clone());

    let slow = catalog.begin(CatalogQuery::search("Bumi"));
    let fast = catalog.begin(CatalogQuery::search("Tolkien"));

    let fast_result = gateway.list_ebooks(&CatalogQuery::search("Tolkien")).await;
    assert!(catalog.finish(fast, fast_result));
    let slow_result = gateway.list_ebooks(&CatalogQuery::search("Bumi")).await;
    assert!(!catalog.finish(slow, slow_result));

    assert_eq!(titles(&catalog), ["The Hobbit", "The Silmarillion"]);
}

#[tokio::test]
async fn test_detail_loads_ebook_and_reviews() {
    let backend = StubBackend::start().await;
    let mut detail = EbookDetailController::new(backend.gateway(), EbookId::new(3));
    let loaded = detail.load().await.ready().unwrap();
    assert_eq!(loaded.ebook.title, "Bumi Manusia");
    assert!(loaded.reviews.is_empty());
}

#[tokio::test]
async fn test_missing_ebook_fails_the_load() {
    let backend = StubBackend::start().await;
    let mut detail = EbookDetailController::new(backend.gateway(), EbookId::new(404));
    let error = detail.load().await.error().unwrap();
    assert!(error.is_not_found());
    assert_eq!(error.detail().as_deref(), Some("Ebook not found"));
}

#[tokio::test]
async fn test_review_is_prepended() {
    let backend = StubBackend::start().await;
    let (_session, gateway) = signed_in(&backend).await;
    let id = EbookId::new(1);

    // An older review from the same reader
    let mut detail = EbookDetailController::new(gateway.clone(), id);
    detail
        .submit_review(&ReviewForm {
            rating: 3,
            comment: "First read".to_string(),
        })
        .await
        .unwrap();

    let mut detail = EbookDetailController::new(gateway, id);
    detail.load().await;
    let created = detail
        .submit_review(&ReviewForm {
            rating: 5,
            comment: "Even better the second time".to_string(),
        })
        .await
        .unwrap();

    let reviews = &detail.detail().ready().unwrap().reviews;
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0], created);
    assert_eq!(reviews[0].rating.get(), 5);
    assert_eq!(
        reviews[0].comment.as_deref(),
        Some("Even better the second time")
    );
    assert_eq!(reviews[0].user.name, READER_NAME);
    assert_eq!(reviews[1].comment.as_deref(), Some("First read"));
}

#[tokio::test]
async fn test_empty_review_is_not_sent() {
    let backend = StubBackend::start().await;
    let (_session, gateway) = signed_in(&backend).await;
    let mut detail = EbookDetailController::new(gateway, EbookId::new(1));
    detail.load().await;

    assert!(
        detail
            .submit_review(&ReviewForm {
                rating: 4,
                comment: "  ".to_string(),
            })
            .await
            .is_err()
    );
    assert!(!backend.received("POST /ebooks/1/reviews"));
    assert!(detail.detail().ready().unwrap().reviews.is_empty());
}

#[tokio::test]
async fn test_signed_out_download_redirects_without_request() {
    let backend = StubBackend::start().await;
    let (_session, gateway) = anonymous(&backend).await;
    let detail = EbookDetailController::new(gateway, EbookId::new(1));

    match detail.download().await.unwrap() {
        DownloadOutcome::Redirect(nav) => {
            assert_eq!(nav.route, Route::Login);
            assert_eq!(nav.notice, Some(Notice::LoginRequiredForDownload));
        }
        DownloadOutcome::File(_) => panic!("expected a redirect"),
    }
    assert!(!backend.received("GET /ebooks/1/download"));
    assert_eq!(backend.download_count(EbookId::new(1)), 0);
}

#[tokio::test]
async fn test_signed_in_download_saves_file() {
    let backend = StubBackend::start().await;
    let (_session, gateway) = signed_in(&backend).await;
    let mut detail = EbookDetailController::new(gateway.clone(), EbookId::new(1));
    detail.load().await;

    let DownloadOutcome::File(file) = detail.download().await.unwrap() else {
        panic!("expected a file");
    };
    assert_eq!(file.filename, "The Hobbit.pdf");
    assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
    assert!(file.bytes.starts_with(b"%PDF"));
    assert_eq!(backend.download_count(EbookId::new(1)), 1);

    let dir = std::env::temp_dir().join(format!("libris-dl-{}", std::process::id()));
    let path = file.save_in(&dir).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap(), file.bytes);
    let _ = tokio::fs::remove_dir_all(&dir).await;

    // The download shows up in the reader's history
    let history = gateway.history().await.unwrap();
    assert_eq!(history[0].action, "download");
    assert_eq!(history[0].ebook.id, EbookId::new(1));
}

#[tokio::test]
async fn test_favorites_roundtrip() {
    let backend = StubBackend::start().await;
    let (_session, gateway) = signed_in(&backend).await;

    gateway.add_favorite(EbookId::new(2)).await.unwrap();
    let favorites = gateway.favorites().await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].title, "The Silmarillion");

    gateway.remove_favorite(EbookId::new(2)).await.unwrap();
    assert!(gateway.favorites().await.unwrap().is_empty());
}
