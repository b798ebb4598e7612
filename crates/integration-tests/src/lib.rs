//! Integration test support for Libris.
//!
//! [`StubBackend`] is a small in-process imitation of the library backend:
//! an axum server on an ephemeral port holding its catalog, accounts and
//! reviews in memory. It issues real JWT-shaped credentials (unsigned) and
//! records every request it receives, so tests can assert that a request was
//! *not* made.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p libris-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Form, Json, Router,
    extract::{Multipart, Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use libris_client::{ClientConfig, Gateway};
use libris_core::{
    ActivityId, ActivityLog, Category, CategoryId, Credential, DashboardSummary, Ebook, EbookId,
    EbookStat, EbookUpdate, MonitoringPanel, NewReview, Review, ReviewId, Role, Timestamp, UserId,
    UserProfile, UserStat, decode_identity,
};
use serde::Deserialize;
use serde_json::json;
use url::Url;

pub const ADMIN_EMAIL: &str = "admin@libris.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const READER_EMAIL: &str = "reader@libris.test";
pub const READER_PASSWORD: &str = "reader-password";
pub const READER_NAME: &str = "Rina Reader";

/// Detail sent for a failed login.
pub const BAD_LOGIN_DETAIL: &str = "Incorrect email or password";

/// Build an unsigned JWT carrying `sub`, `role` and optional `exp`.
#[must_use]
pub fn mint_token(subject: &str, role: &str, expires_at: Option<i64>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let mut claims = json!({"sub": subject, "role": role});
    if let Some(exp) = expires_at {
        claims["exp"] = json!(exp);
    }
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.stub-signature")
}

struct Account {
    profile: UserProfile,
    password: String,
}

#[derive(Default)]
struct Library {
    accounts: Vec<Account>,
    ebooks: Vec<Ebook>,
    reviews: HashMap<EbookId, Vec<Review>>,
    favorites: HashMap<UserId, Vec<EbookId>>,
    history: Vec<(UserId, ActivityLog)>,
    downloads: HashMap<EbookId, i64>,
    requests: Vec<String>,
    next_id: i32,
}

impl Library {
    fn seeded() -> Self {
        let mut library = Self {
            next_id: 100,
            ..Self::default()
        };
        library.add_account("Ada Admin", ADMIN_EMAIL, ADMIN_PASSWORD, Role::Admin);
        library.add_account(READER_NAME, READER_EMAIL, READER_PASSWORD, Role::User);

        let fantasy = Category {
            id: CategoryId::new(1),
            name: "Fantasy".to_string(),
        };
        library.ebooks = vec![
            book(1, "The Hobbit", "J.R.R. Tolkien", Some(1937), vec![fantasy.clone()]),
            book(2, "The Silmarillion", "J.R.R. Tolkien", Some(1977), vec![fantasy]),
            book(3, "Bumi Manusia", "Pramoedya Ananta Toer", Some(1980), Vec::new()),
        ];
        library
    }

    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn add_account(&mut self, name: &str, email: &str, password: &str, role: Role) -> UserProfile {
        let profile = UserProfile {
            id: UserId::new(i32::try_from(self.accounts.len()).unwrap_or(0) + 1),
            name: name.to_string(),
            email: email.to_string(),
            role,
        };
        self.accounts.push(Account {
            profile: profile.clone(),
            password: password.to_string(),
        });
        profile
    }

    fn ebook(&self, id: EbookId) -> Result<&Ebook, StubError> {
        self.ebooks
            .iter()
            .find(|e| e.id == id)
            .ok_or(StubError::NotFound("Ebook not found"))
    }

    fn record(&mut self, user: UserId, action: &str, ebook: Ebook) {
        let id = ActivityId::new(self.next_id());
        self.history.push((
            user,
            ActivityLog {
                id,
                action: action.to_string(),
                timestamp: Timestamp::new(Utc::now()),
                ebook,
            },
        ));
    }
}

fn book(id: i32, title: &str, author: &str, year: Option<i32>, categories: Vec<Category>) -> Ebook {
    Ebook {
        id: EbookId::new(id),
        title: title.to_string(),
        author: Some(author.to_string()),
        description: Some(format!("{title} by {author}.")),
        publication_year: year,
        cover_image_path: Some(format!("static/covers/{id}.png")),
        categories,
    }
}

type Shared = Arc<Mutex<Library>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Library> {
    shared.lock().expect("stub library lock poisoned")
}

enum StubError {
    Unauthorized,
    Forbidden,
    NotFound(&'static str),
    BadRequest(String),
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Not authenticated".to_string()),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin privileges required".to_string()),
            Self::NotFound(detail) => (StatusCode::NOT_FOUND, detail.to_string()),
            Self::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Resolve the bearer credential to an account profile.
fn caller(headers: &HeaderMap, library: &Library) -> Result<UserProfile, StubError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StubError::Unauthorized)?;
    let identity =
        decode_identity(&Credential::new(token)).map_err(|_| StubError::Unauthorized)?;
    library
        .accounts
        .iter()
        .find(|a| a.profile.email == identity.subject)
        .map(|a| a.profile.clone())
        .ok_or(StubError::Unauthorized)
}

fn admin(headers: &HeaderMap, library: &Library) -> Result<UserProfile, StubError> {
    let profile = caller(headers, library)?;
    if profile.role == Role::Admin {
        Ok(profile)
    } else {
        Err(StubError::Forbidden)
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(shared): State<Shared>, Form(form): Form<LoginForm>) -> Response {
    let library = lock(&shared);
    let account = library
        .accounts
        .iter()
        .find(|a| a.profile.email == form.username && a.password == form.password);
    match account {
        Some(account) => {
            let exp = Utc::now().timestamp() + 3600;
            let token = mint_token(&account.profile.email, account.profile.role.as_str(), Some(exp));
            Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": BAD_LOGIN_DETAIL })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

async fn register(
    State(shared): State<Shared>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<UserProfile>, StubError> {
    let mut library = lock(&shared);
    if library.accounts.iter().any(|a| a.profile.email == body.email) {
        return Err(StubError::BadRequest("Email already registered".to_string()));
    }
    let profile = library.add_account(&body.name, &body.email, &body.password, Role::User);
    Ok(Json(profile))
}

#[derive(Deserialize)]
struct ListParams {
    search: Option<String>,
    skip: Option<usize>,
    limit: Option<usize>,
}

async fn list_ebooks(
    State(shared): State<Shared>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Ebook>> {
    let library = lock(&shared);
    let term = params.search.unwrap_or_default().to_lowercase();
    let matches = library
        .ebooks
        .iter()
        .filter(|e| {
            term.is_empty()
                || e.title.to_lowercase().contains(&term)
                || e.author
                    .as_deref()
                    .is_some_and(|a| a.to_lowercase().contains(&term))
        })
        .skip(params.skip.unwrap_or(0))
        .take(params.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    Json(matches)
}

async fn get_ebook(
    State(shared): State<Shared>,
    Path(id): Path<EbookId>,
) -> Result<Json<Ebook>, StubError> {
    let library = lock(&shared);
    library.ebook(id).cloned().map(Json)
}

async fn create_ebook(
    State(shared): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Ebook>, StubError> {
    admin(&headers, &lock(&shared))?;

    let mut fields: HashMap<String, String> = HashMap::new();
    let mut files: HashMap<String, (String, usize)> = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StubError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if let Some(filename) = field.file_name().map(str::to_string) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| StubError::BadRequest(e.to_string()))?;
            files.insert(name, (filename, bytes.len()));
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| StubError::BadRequest(e.to_string()))?;
            fields.insert(name, text);
        }
    }

    let (Some(title), Some(author)) = (fields.get("title"), fields.get("author")) else {
        return Err(StubError::BadRequest("title and author are required".to_string()));
    };
    if !files.contains_key("pdf_file") {
        return Err(StubError::BadRequest("pdf_file is required".to_string()));
    }
    let Some((cover_name, _)) = files.get("cover_image") else {
        return Err(StubError::BadRequest("cover_image is required".to_string()));
    };

    let mut library = lock(&shared);
    let id = library.next_id();
    let ebook = Ebook {
        id: EbookId::new(id),
        title: title.clone(),
        author: Some(author.clone()),
        description: fields.get("description").cloned(),
        publication_year: fields.get("publication_year").and_then(|y| y.parse().ok()),
        cover_image_path: Some(format!("static/covers/{cover_name}")),
        categories: Vec::new(),
    };
    library.ebooks.push(ebook.clone());
    Ok(Json(ebook))
}

async fn update_ebook(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<EbookId>,
    Json(update): Json<EbookUpdate>,
) -> Result<Json<Ebook>, StubError> {
    let mut library = lock(&shared);
    admin(&headers, &library)?;
    let ebook = library
        .ebooks
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or(StubError::NotFound("Ebook not found"))?;
    if let Some(title) = update.title {
        ebook.title = title;
    }
    if update.author.is_some() {
        ebook.author = update.author;
    }
    if update.description.is_some() {
        ebook.description = update.description;
    }
    if update.publication_year.is_some() {
        ebook.publication_year = update.publication_year;
    }
    Ok(Json(ebook.clone()))
}

async fn delete_ebook(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<EbookId>,
) -> Result<StatusCode, StubError> {
    let mut library = lock(&shared);
    admin(&headers, &library)?;
    library.ebook(id)?;
    library.ebooks.retain(|e| e.id != id);
    library.reviews.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_reviews(
    State(shared): State<Shared>,
    Path(id): Path<EbookId>,
) -> Result<Json<Vec<Review>>, StubError> {
    let library = lock(&shared);
    library.ebook(id)?;
    Ok(Json(library.reviews.get(&id).cloned().unwrap_or_default()))
}

async fn post_review(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<EbookId>,
    Json(body): Json<NewReview>,
) -> Result<Json<Review>, StubError> {
    let mut library = lock(&shared);
    let user = caller(&headers, &library)?;
    let ebook = library.ebook(id)?.clone();

    let review = Review {
        id: ReviewId::new(library.next_id()),
        rating: body.rating,
        comment: Some(body.comment),
        user: user.clone(),
        timestamp: Timestamp::new(Utc::now()),
    };
    library.reviews.entry(id).or_default().insert(0, review.clone());
    library.record(user.id, "review", ebook);
    Ok(Json(review))
}

async fn download(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<EbookId>,
) -> Result<Response, StubError> {
    let mut library = lock(&shared);
    let user = caller(&headers, &library)?;
    let ebook = library.ebook(id)?.clone();

    *library.downloads.entry(id).or_default() += 1;
    let body = format!("%PDF-1.4 {}", ebook.title);
    library.record(user.id, "download", ebook);
    Ok(([(header::CONTENT_TYPE, "application/pdf")], body).into_response())
}

async fn add_favorite(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<EbookId>,
) -> Result<StatusCode, StubError> {
    let mut library = lock(&shared);
    let user = caller(&headers, &library)?;
    library.ebook(id)?;
    let favorites = library.favorites.entry(user.id).or_default();
    if !favorites.contains(&id) {
        favorites.push(id);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_favorite(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<EbookId>,
) -> Result<StatusCode, StubError> {
    let mut library = lock(&shared);
    let user = caller(&headers, &library)?;
    if let Some(favorites) = library.favorites.get_mut(&user.id) {
        favorites.retain(|f| *f != id);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(shared): State<Shared>, headers: HeaderMap) -> Result<Json<UserProfile>, StubError> {
    caller(&headers, &lock(&shared)).map(Json)
}

async fn my_history(
    State(shared): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<ActivityLog>>, StubError> {
    let library = lock(&shared);
    let user = caller(&headers, &library)?;
    let entries = library
        .history
        .iter()
        .rev()
        .filter(|(owner, _)| *owner == user.id)
        .map(|(_, entry)| entry.clone())
        .collect();
    Ok(Json(entries))
}

async fn my_favorites(
    State(shared): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<Ebook>>, StubError> {
    let library = lock(&shared);
    let user = caller(&headers, &library)?;
    let ids = library.favorites.get(&user.id).cloned().unwrap_or_default();
    let ebooks = library
        .ebooks
        .iter()
        .filter(|e| ids.contains(&e.id))
        .cloned()
        .collect();
    Ok(Json(ebooks))
}

fn download_stats(library: &Library) -> Vec<EbookStat> {
    let mut stats: Vec<EbookStat> = library
        .ebooks
        .iter()
        .filter_map(|e| {
            library.downloads.get(&e.id).map(|count| EbookStat {
                ebook: e.clone(),
                download_count: *count,
            })
        })
        .collect();
    stats.sort_by(|a, b| b.download_count.cmp(&a.download_count));
    stats
}

async fn stats_summary(
    State(shared): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<DashboardSummary>, StubError> {
    let library = lock(&shared);
    admin(&headers, &library)?;

    let top_active_users = library
        .accounts
        .iter()
        .map(|a| UserStat {
            user: a.profile.clone(),
            activity_count: i64::try_from(
                library.history.iter().filter(|(u, _)| *u == a.profile.id).count(),
            )
            .unwrap_or(i64::MAX),
        })
        .filter(|s| s.activity_count > 0)
        .collect();

    Ok(Json(DashboardSummary {
        total_users: i64::try_from(library.accounts.len()).unwrap_or(i64::MAX),
        top_active_users,
        most_downloaded_ebooks: download_stats(&library),
    }))
}

#[derive(Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

async fn most_downloaded(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<EbookStat>>, StubError> {
    let library = lock(&shared);
    admin(&headers, &library)?;
    let mut stats = download_stats(&library);
    stats.truncate(params.limit.unwrap_or(5));
    Ok(Json(stats))
}

async fn monitoring(
    State(shared): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<MonitoringPanel>, StubError> {
    let library = lock(&shared);
    admin(&headers, &library)?;
    Ok(Json(MonitoringPanel {
        latest_users: library.accounts.iter().rev().take(5).map(|a| a.profile.clone()).collect(),
        latest_ebooks: library.ebooks.iter().rev().take(5).cloned().collect(),
    }))
}

async fn record_request(State(shared): State<Shared>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    lock(&shared).requests.push(line);
    next.run(request).await
}

fn stub_router(shared: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/ebooks", get(list_ebooks))
        .route("/ebooks/", post(create_ebook))
        .route(
            "/ebooks/{id}",
            get(get_ebook).put(update_ebook).delete(delete_ebook),
        )
        .route("/ebooks/{id}/reviews", get(list_reviews).post(post_review))
        .route("/ebooks/{id}/download", get(download))
        .route("/ebooks/{id}/favorite", post(add_favorite).delete(remove_favorite))
        .route("/users/me", get(me))
        .route("/users/me/history", get(my_history))
        .route("/users/me/favorites", get(my_favorites))
        .route("/admin/stats/summary", get(stats_summary))
        .route("/admin/stats/most-downloaded", get(most_downloaded))
        .route("/admin/monitoring/latest", get(monitoring))
        .layer(axum::middleware::from_fn_with_state(shared.clone(), record_request))
        .with_state(shared)
}

// =============================================================================
// Harness
// =============================================================================

/// A running stub backend. The server stops when the test's runtime ends.
pub struct StubBackend {
    addr: SocketAddr,
    shared: Shared,
}

impl StubBackend {
    /// Start a seeded backend on an ephemeral port.
    ///
    /// Seeded with an admin and a reader account and three e-books, two of
    /// them by Tolkien.
    pub async fn start() -> Self {
        let shared: Shared = Arc::new(Mutex::new(Library::seeded()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend address");

        let app = stub_router(shared.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend");
        });

        Self { addr, shared }
    }

    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("stub backend URL")
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url())
    }

    /// A session-less gateway pointed at this backend.
    #[must_use]
    pub fn gateway(&self) -> Gateway {
        Gateway::new(&self.client_config()).expect("gateway for stub backend")
    }

    /// Every request received so far, as `"METHOD /path"`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.shared).requests.clone()
    }

    /// Whether any request matched `"METHOD /path"` exactly.
    #[must_use]
    pub fn received(&self, line: &str) -> bool {
        lock(&self.shared).requests.iter().any(|r| r == line)
    }

    #[must_use]
    pub fn download_count(&self, id: EbookId) -> i64 {
        lock(&self.shared).downloads.get(&id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn ebook_titles(&self) -> Vec<String> {
        lock(&self.shared).ebooks.iter().map(|e| e.title.clone()).collect()
    }
}
