//! Login, registration and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use libris_client::Route;
use libris_client::controllers::auth::{LOGIN_FAILED, LoginForm, REGISTER_FAILED, RegisterForm};
use libris_client::controllers::{Navigation, Notice};
use secrecy::SecretString;
use serde::Deserialize;

use super::NoticeQuery;
use crate::filters;
use crate::middleware::CurrentSession;
use crate::views::Layout;

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Display the login page.
pub async fn login_page(current: CurrentSession, Query(query): Query<NoticeQuery>) -> Response {
    if current.state().is_authenticated() {
        return Redirect::to(&Route::Home.path()).into_response();
    }
    LoginTemplate {
        layout: current.layout(query.notice()),
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// Sign in and go to the catalog.
pub async fn login(current: CurrentSession, Form(input): Form<LoginInput>) -> Response {
    let form = LoginForm {
        email: input.email,
        password: SecretString::from(input.password),
    };

    match form.submit(current.session(), current.gateway()).await {
        Ok(nav) => Redirect::to(&nav.href()).into_response(),
        Err(e) => {
            tracing::info!(error = %e, "Login rejected");
            LoginTemplate {
                layout: current.layout(None),
                error: Some(e.user_message(LOGIN_FAILED)),
                email: form.email,
            }
            .into_response()
        }
    }
}

/// Display the registration page.
pub async fn register_page(current: CurrentSession) -> RegisterTemplate {
    RegisterTemplate {
        layout: current.layout(None),
        name: String::new(),
        email: String::new(),
        error: None,
    }
}

/// Create an account, then continue to the login page.
pub async fn register(current: CurrentSession, Form(input): Form<RegisterInput>) -> Response {
    let form = RegisterForm {
        name: input.name,
        email: input.email,
        password: SecretString::from(input.password),
    };

    match form.submit(current.gateway()).await {
        Ok(nav) => Redirect::to(&nav.href()).into_response(),
        Err(e) => {
            tracing::info!(error = %e, "Registration rejected");
            RegisterTemplate {
                layout: current.layout(None),
                error: Some(e.user_message(REGISTER_FAILED)),
                name: form.name,
                email: form.email,
            }
            .into_response()
        }
    }
}

/// Sign out and return to the login page.
pub async fn logout(current: CurrentSession) -> Redirect {
    if let Err(e) = current.session().logout().await {
        // The in-memory session is already cleared
        tracing::warn!(error = %e, "Failed to clear stored credential");
    }
    Redirect::to(&Navigation::with_notice(Route::Login, Notice::SignedOut).href())
}
