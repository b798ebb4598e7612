//! Profile page: account details and activity history.

use libris_core::{ActivityLog, UserProfile};

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::resource::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePage {
    pub profile: UserProfile,
    pub history: Vec<ActivityLog>,
}

#[derive(Debug)]
pub struct ProfileController {
    gateway: Gateway,
    page: Resource<ProfilePage, GatewayError>,
}

impl ProfileController {
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            page: Resource::Idle,
        }
    }

    #[must_use]
    pub const fn page(&self) -> &Resource<ProfilePage, GatewayError> {
        &self.page
    }

    #[must_use]
    pub fn into_page(self) -> Resource<ProfilePage, GatewayError> {
        self.page
    }

    /// Fetch profile and history concurrently.
    pub async fn load(&mut self) -> &Resource<ProfilePage, GatewayError> {
        self.page = Resource::Loading;
        let result = tokio::try_join!(self.gateway.profile(), self.gateway.history());
        self.page = result
            .map(|(profile, history)| ProfilePage { profile, history })
            .into();
        &self.page
    }
}
