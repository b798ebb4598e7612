//! The browser frontend end to end: a real web server in front of the stub
//! backend, driven by a cookie-keeping HTTP client.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use libris_client::ClientConfig;
use libris_core::EbookId;
use libris_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, BAD_LOGIN_DETAIL, READER_EMAIL, READER_NAME, READER_PASSWORD,
    StubBackend,
};
use libris_web::config::WebConfig;
use libris_web::state::AppState;
use reqwest::{Client, Response, StatusCode, header, redirect};

struct Frontend {
    base: String,
    browser: Client,
}

impl Frontend {
    async fn start(client: ClientConfig) -> Self {
        let config = WebConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost".to_string(),
            client,
            sentry_dsn: None,
            sentry_environment: None,
        };
        let app = libris_web::router(AppState::new(config).unwrap());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let browser = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();
        Self {
            base: format!("http://{addr}"),
            browser,
        }
    }

    async fn get(&self, path: &str) -> Response {
        self.browser
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.browser
            .post(format!("{}{path}", self.base))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    async fn login(&self, email: &str, password: &str) -> Response {
        self.post("/login", &[("email", email), ("password", password)])
            .await
    }
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_catalog_search() {
    let backend = StubBackend::start().await;
    let web = Frontend::start(backend.client_config()).await;

    let page = web.get("/").await.text().await.unwrap();
    assert!(page.contains("The Hobbit"));
    assert!(page.contains("Bumi Manusia"));

    let page = web.get("/?search=Tolkien").await.text().await.unwrap();
    assert!(page.contains("The Silmarillion"));
    assert!(!page.contains("Bumi Manusia"));
}

#[tokio::test]
async fn test_signed_out_download_goes_to_login() {
    let backend = StubBackend::start().await;
    let web = Frontend::start(backend.client_config()).await;

    let response = web.get("/ebook/1/download").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?notice=login-to-download");
    assert!(!backend.received("GET /ebooks/1/download"));

    let page = web
        .get("/login?notice=login-to-download")
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains("You need to sign in before downloading."));
}

#[tokio::test]
async fn test_failed_login_shows_message() {
    let backend = StubBackend::start().await;
    let web = Frontend::start(backend.client_config()).await;

    let response = web.login(READER_EMAIL, "nope").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains(BAD_LOGIN_DETAIL));
    assert!(page.contains(READER_EMAIL));
}

#[tokio::test]
async fn test_reader_session_flow() {
    let backend = StubBackend::start().await;
    let web = Frontend::start(backend.client_config()).await;

    let response = web.login(READER_EMAIL, READER_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let profile = web.get("/profile").await;
    assert_eq!(profile.status(), StatusCode::OK);
    assert!(profile.text().await.unwrap().contains(READER_NAME));

    // Readers are sent home from admin pages
    let admin = web.get("/admin/dashboard").await;
    assert_eq!(admin.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&admin), "/");

    let download = web.get("/ebook/1/download").await;
    assert_eq!(download.status(), StatusCode::OK);
    assert_eq!(
        download.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename*=UTF-8''The%20Hobbit.pdf"
    );
    assert!(download.bytes().await.unwrap().starts_with(b"%PDF"));
    assert_eq!(backend.download_count(EbookId::new(1)), 1);

    let logout = web.post("/logout", &[]).await;
    assert_eq!(location(&logout), "/login?notice=signed-out");

    let profile = web.get("/profile").await;
    assert_eq!(profile.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&profile), "/login");
}

#[tokio::test]
async fn test_review_appears_first() {
    let backend = StubBackend::start().await;
    let web = Frontend::start(backend.client_config()).await;
    web.login(READER_EMAIL, READER_PASSWORD).await;

    web.post("/ebook/2/reviews", &[("rating", "3"), ("comment", "Dense but rewarding")])
        .await;
    let response = web
        .post("/ebook/2/reviews", &[("rating", "5"), ("comment", "Loved the maps")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = response.text().await.unwrap();
    assert!(page.contains("Thanks for your review."));
    let newest = page.find("Loved the maps").unwrap();
    let older = page.find("Dense but rewarding").unwrap();
    assert!(newest < older);
}

#[tokio::test]
async fn test_empty_review_shows_error() {
    let backend = StubBackend::start().await;
    let web = Frontend::start(backend.client_config()).await;
    web.login(READER_EMAIL, READER_PASSWORD).await;

    let page = web
        .post("/ebook/2/reviews", &[("rating", "4"), ("comment", "")])
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains("comment is required"));
    assert!(!backend.received("POST /ebooks/2/reviews"));
}

#[tokio::test]
async fn test_admin_manages_catalog() {
    let backend = StubBackend::start().await;
    let web = Frontend::start(backend.client_config()).await;
    web.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let dashboard = web.get("/admin/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    assert!(dashboard.text().await.unwrap().contains("registered users"));

    let page = web
        .post("/admin/ebooks/2/delete", &[])
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains("E-book deleted."));
    assert!(!page.contains("The Silmarillion"));

    let edit = web
        .post(
            "/admin/ebooks/edit/1",
            &[
                ("title", "The Hobbit, or There and Back Again"),
                ("author", "J. R. R. Tolkien"),
                ("description", ""),
                ("publication_year", ""),
            ],
        )
        .await;
    assert_eq!(edit.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&edit), "/admin/ebooks?notice=ebook-updated");
    assert!(
        backend
            .ebook_titles()
            .contains(&"The Hobbit, or There and Back Again".to_string())
    );
}

#[tokio::test]
async fn test_theme_toggle_sticks() {
    let backend = StubBackend::start().await;
    let web = Frontend::start(backend.client_config()).await;

    assert!(web.get("/").await.text().await.unwrap().contains("light-mode"));

    let response = web.post("/theme", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(web.get("/").await.text().await.unwrap().contains("dark-mode"));
}
