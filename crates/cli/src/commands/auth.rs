//! `login`, `logout`, `register`, `whoami`.

use libris_client::controllers::auth::{LOGIN_FAILED, LoginForm, REGISTER_FAILED, RegisterForm};
use secrecy::SecretString;

use crate::context::Context;
use crate::error::CliError;

pub async fn login(ctx: &Context, email: String, password: SecretString) -> Result<(), CliError> {
    let form = LoginForm { email, password };
    form.submit(&ctx.session, &ctx.gateway)
        .await
        .map_err(|e| CliError::rejected(&e, LOGIN_FAILED))?;

    let state = ctx.session.state().await;
    match state.identity() {
        Some(identity) => println!("Signed in as {} ({})", identity.subject, identity.role),
        None => println!("Signed in"),
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<(), CliError> {
    ctx.session.logout().await?;
    println!("Signed out");
    Ok(())
}

pub async fn register(
    ctx: &Context,
    name: String,
    email: String,
    password: SecretString,
) -> Result<(), CliError> {
    let form = RegisterForm {
        name,
        email,
        password,
    };
    let nav = form
        .submit(&ctx.gateway)
        .await
        .map_err(|e| CliError::rejected(&e, REGISTER_FAILED))?;
    if let Some(notice) = nav.notice {
        println!("{notice}");
    }
    Ok(())
}

/// Print the decoded identity of the stored credential.
pub fn whoami(ctx: &Context) {
    let Some(identity) = ctx.state.identity() else {
        println!("Not signed in");
        return;
    };
    println!("{} ({})", identity.subject, identity.role);
    if let Some(expires_at) = identity.expires_at {
        println!("Session expires {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
    }
}
