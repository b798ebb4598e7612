//! Home page: the catalog with search-as-you-type.

use libris_core::Ebook;
use tracing::debug;

use crate::error::GatewayError;
use crate::gateway::{CatalogQuery, Gateway};
use crate::resource::{Resource, Ticket, Tickets};

/// Catalog listing state.
///
/// Every keystroke may start a new search. Responses are applied only if no
/// newer search was started in the meantime, so a slow response for `"Tol"`
/// can never overwrite the results for `"Tolkien"`.
#[derive(Debug)]
pub struct CatalogController {
    gateway: Gateway,
    query: CatalogQuery,
    tickets: Tickets,
    ebooks: Resource<Vec<Ebook>, GatewayError>,
}

impl CatalogController {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            query: CatalogQuery::default(),
            tickets: Tickets::default(),
            ebooks: Resource::Idle,
        }
    }

    #[must_use]
    pub const fn ebooks(&self) -> &Resource<Vec<Ebook>, GatewayError> {
        &self.ebooks
    }

    /// The search term currently shown.
    #[must_use]
    pub fn term(&self) -> &str {
        self.query.search.as_deref().unwrap_or_default()
    }

    /// Start a search: record the query and mark the listing as loading.
    pub fn begin(&mut self, query: CatalogQuery) -> Ticket {
        self.query = query;
        self.ebooks = Resource::Loading;
        self.tickets.issue()
    }

    /// Apply a response. Returns `false` when it was stale and discarded.
    pub fn finish(&mut self, ticket: Ticket, result: Result<Vec<Ebook>, GatewayError>) -> bool {
        if !self.tickets.is_current(ticket) {
            debug!(?ticket, "Discarding stale catalog response");
            return false;
        }
        self.ebooks = result.into();
        true
    }

    /// Fetch the listing for `query`. An empty search lists the whole catalog.
    pub async fn load(&mut self, query: CatalogQuery) -> &Resource<Vec<Ebook>, GatewayError> {
        let ticket = self.begin(query);
        let result = self.gateway.list_ebooks(&self.query).await;
        self.finish(ticket, result);
        &self.ebooks
    }

    /// Convenience for a plain search term.
    pub async fn search(&mut self, term: &str) -> &Resource<Vec<Ebook>, GatewayError> {
        self.load(CatalogQuery::search(term)).await
    }
}
