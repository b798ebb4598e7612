//! Administrative statistics.

use serde::{Deserialize, Serialize};

use super::ebook::Ebook;
use super::user::UserProfile;

/// A user together with the number of recorded activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStat {
    pub user: UserProfile,
    pub activity_count: i64,
}

/// An e-book together with its download count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbookStat {
    pub ebook: Ebook,
    pub download_count: i64,
}

/// `GET /admin/stats/summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_users: i64,
    #[serde(default)]
    pub top_active_users: Vec<UserStat>,
    #[serde(default)]
    pub most_downloaded_ebooks: Vec<EbookStat>,
}

/// `GET /admin/monitoring/latest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringPanel {
    #[serde(default)]
    pub latest_users: Vec<UserProfile>,
    #[serde(default)]
    pub latest_ebooks: Vec<Ebook>,
}
