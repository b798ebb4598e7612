//! Account page.

use askama::Template;
use askama_web::WebTemplate;
use libris_client::Resource;
use libris_client::controllers::profile::{ProfileController, ProfilePage};

use super::load_error;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::views::{ActivityView, Layout, ProfileView};

#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub profile: Option<ProfileView>,
    pub history: Vec<ActivityView>,
    pub error: Option<String>,
}

/// Display the signed-in user's profile and activity history.
pub async fn show(RequireAuth(current): RequireAuth) -> ProfileTemplate {
    let mut controller = ProfileController::new(current.gateway().clone());
    let (profile, history, error) = match controller.load().await {
        Resource::Ready(ProfilePage { profile, history }) => (
            Some(ProfileView::from(profile)),
            history.iter().map(ActivityView::from).collect(),
            None,
        ),
        Resource::Failed(e) => (None, Vec::new(), Some(load_error(e))),
        Resource::Idle | Resource::Loading => (None, Vec::new(), None),
    };

    ProfileTemplate {
        layout: current.layout(None),
        profile,
        history,
        error,
    }
}
