//! Administrative statistics. All of these require the elevated role.

use libris_core::{DashboardSummary, EbookStat, MonitoringPanel};
use reqwest::Method;
use tracing::instrument;

use super::Gateway;
use crate::error::GatewayError;

impl Gateway {
    /// `GET /admin/stats/summary`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, GatewayError> {
        let url = self.endpoint(&["admin", "stats", "summary"])?;
        Self::send_json(self.request(Method::GET, url).await).await
    }

    /// `GET /admin/stats/most-downloaded`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn most_downloaded(&self, limit: Option<u32>) -> Result<Vec<EbookStat>, GatewayError> {
        let mut url = self.endpoint(&["admin", "stats", "most-downloaded"])?;
        if let Some(limit) = limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        Self::send_json(self.request(Method::GET, url).await).await
    }

    /// `GET /admin/monitoring/latest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn monitoring_panel(&self) -> Result<MonitoringPanel, GatewayError> {
        let url = self.endpoint(&["admin", "monitoring", "latest"])?;
        Self::send_json(self.request(Method::GET, url).await).await
    }
}
