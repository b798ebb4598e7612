//! Home page: the catalog with search-as-you-type.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use libris_client::controllers::Notice;
use libris_client::controllers::catalog::CatalogController;
use libris_client::{CatalogQuery, Resource};
use libris_core::SortOrder;
use serde::Deserialize;

use super::load_error;
use crate::filters;
use crate::middleware::CurrentSession;
use crate::state::AppState;
use crate::views::{EbookCard, Layout};

#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    #[serde(default)]
    pub search: String,
    pub sort_by: Option<String>,
    pub notice: Option<String>,
}

/// Full page, or just the results when requested by htmx.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub search: String,
    pub sort_by: String,
    pub ebooks: Vec<EbookCard>,
    pub error: Option<String>,
}

/// Display the catalog, filtered by `search` when given.
pub async fn index(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(params): Query<CatalogParams>,
) -> impl IntoResponse {
    let sort_by = params.sort_by.as_deref().and_then(SortOrder::parse);
    let query = CatalogQuery {
        search: Some(params.search.clone()),
        sort_by,
        ..CatalogQuery::default()
    };

    let mut catalog = CatalogController::new(current.gateway().clone());
    let (ebooks, error) = match catalog.load(query).await {
        Resource::Ready(list) => (EbookCard::list(list, state.api_base_url()), None),
        Resource::Failed(e) => (Vec::new(), Some(load_error(e))),
        Resource::Idle | Resource::Loading => (Vec::new(), None),
    };

    HomeTemplate {
        layout: current.layout(params.notice.as_deref().and_then(Notice::from_code)),
        search: params.search,
        sort_by: sort_by.map(|s| s.as_str().to_string()).unwrap_or_default(),
        ebooks,
        error,
    }
}
