//! Sign-in, persistence and sign-out against the stub backend.

#![allow(clippy::unwrap_used)]

use libris_client::controllers::auth::{LOGIN_FAILED, LoginForm, RegisterForm};
use libris_client::controllers::{Notice, SubmitError};
use libris_client::guard::{self, GuardDecision};
use libris_client::storage::TOKEN;
use libris_client::{FileStorage, MemoryStorage, Route, Session, Storage};
use libris_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, BAD_LOGIN_DETAIL, READER_EMAIL, READER_PASSWORD, StubBackend,
    mint_token,
};
use secrecy::SecretString;

fn login_form(email: &str, password: &str) -> LoginForm {
    LoginForm {
        email: email.to_string(),
        password: SecretString::from(password),
    }
}

#[tokio::test]
async fn test_login_persists_credential_and_restores() {
    let backend = StubBackend::start().await;
    let storage = MemoryStorage::new();

    let session = Session::new(storage.clone());
    assert!(!session.restore().await.is_authenticated());

    let gateway = backend.gateway().for_session(session.handle());
    let nav = login_form(READER_EMAIL, READER_PASSWORD)
        .submit(&session, &gateway)
        .await
        .unwrap();
    assert_eq!(nav.route, Route::Home);

    let state = session.state().await;
    assert!(state.is_authenticated());
    assert!(!state.is_admin());
    assert!(storage.get(TOKEN).await.unwrap().is_some());

    // A fresh session over the same storage picks the credential up again
    let reopened = Session::new(storage);
    let restored = reopened.restore().await;
    assert_eq!(restored.identity().unwrap().subject, READER_EMAIL);

    let profile = backend
        .gateway()
        .for_session(reopened.handle())
        .profile()
        .await
        .unwrap();
    assert_eq!(profile.email, READER_EMAIL);
}

#[tokio::test]
async fn test_failed_login_leaves_session_untouched() {
    let backend = StubBackend::start().await;
    let storage = MemoryStorage::new();
    let session = Session::new(storage.clone());
    let before = session.restore().await;

    let gateway = backend.gateway().for_session(session.handle());
    let err = login_form(READER_EMAIL, "wrong-password")
        .submit(&session, &gateway)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(LOGIN_FAILED), BAD_LOGIN_DETAIL);
    assert_eq!(session.state().await, before);
    assert_eq!(storage.get(TOKEN).await.unwrap(), None);
}

#[tokio::test]
async fn test_empty_login_is_rejected_locally() {
    let backend = StubBackend::start().await;
    let session = Session::new(MemoryStorage::new());
    session.restore().await;
    let gateway = backend.gateway().for_session(session.handle());

    let err = login_form("", "secret")
        .submit(&session, &gateway)
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(_)));
    assert!(!backend.received("POST /auth/login"));
}

#[tokio::test]
async fn test_admin_identity_passes_elevated_guard() {
    let backend = StubBackend::start().await;
    let session = Session::new(MemoryStorage::new());
    session.restore().await;
    let gateway = backend.gateway().for_session(session.handle());

    login_form(ADMIN_EMAIL, ADMIN_PASSWORD)
        .submit(&session, &gateway)
        .await
        .unwrap();
    let state = session.state().await;
    assert!(state.is_admin());
    assert_eq!(guard::require_elevated(&state), GuardDecision::Render);
}

#[tokio::test]
async fn test_reader_is_sent_home_from_admin_pages() {
    let backend = StubBackend::start().await;
    let session = Session::new(MemoryStorage::new());
    session.restore().await;
    let gateway = backend.gateway().for_session(session.handle());

    login_form(READER_EMAIL, READER_PASSWORD)
        .submit(&session, &gateway)
        .await
        .unwrap();
    assert_eq!(
        guard::require_elevated(&session.state().await),
        GuardDecision::Redirect(Route::Home)
    );
}

#[tokio::test]
async fn test_logout_clears_storage() {
    let backend = StubBackend::start().await;
    let storage = MemoryStorage::new();
    let session = Session::new(storage.clone());
    session.restore().await;
    let before = session.state().await;
    let gateway = backend.gateway().for_session(session.handle());

    login_form(READER_EMAIL, READER_PASSWORD)
        .submit(&session, &gateway)
        .await
        .unwrap();
    session.logout().await.unwrap();

    assert_eq!(session.state().await, before);
    assert_eq!(storage.get(TOKEN).await.unwrap(), None);
    assert_eq!(
        guard::require_authenticated(&session.state().await),
        GuardDecision::Redirect(Route::Login)
    );

    // Anonymous requests no longer carry a credential
    assert!(gateway.profile().await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn test_expired_credential_is_discarded_on_restore() {
    let storage = MemoryStorage::new();
    storage
        .set(TOKEN, &mint_token(READER_EMAIL, "user", Some(1_000_000)))
        .await
        .unwrap();

    let session = Session::new(storage.clone());
    assert!(!session.restore().await.is_authenticated());
    assert_eq!(storage.get(TOKEN).await.unwrap(), None);
}

#[tokio::test]
async fn test_file_storage_survives_restart() {
    let backend = StubBackend::start().await;
    let dir = std::env::temp_dir().join(format!("libris-it-{}", std::process::id()));
    let _ = tokio::fs::remove_dir_all(&dir).await;

    {
        let session = Session::new(FileStorage::in_dir(&dir));
        session.restore().await;
        let gateway = backend.gateway().for_session(session.handle());
        login_form(READER_EMAIL, READER_PASSWORD)
            .submit(&session, &gateway)
            .await
            .unwrap();
    }

    let session = Session::new(FileStorage::in_dir(&dir));
    assert_eq!(
        session.restore().await.identity().unwrap().subject,
        READER_EMAIL
    );

    session.logout().await.unwrap();
    let session = Session::new(FileStorage::in_dir(&dir));
    assert!(!session.restore().await.is_authenticated());

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn test_corrupt_state_file_does_not_block_login() {
    let backend = StubBackend::start().await;
    let dir = std::env::temp_dir().join(format!("libris-it-corrupt-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join(FileStorage::FILE_NAME), b"{trunc")
        .await
        .unwrap();

    let session = Session::new(FileStorage::in_dir(&dir));
    assert!(!session.restore().await.is_authenticated());

    let gateway = backend.gateway().for_session(session.handle());
    login_form(READER_EMAIL, READER_PASSWORD)
        .submit(&session, &gateway)
        .await
        .unwrap();

    let reopened = Session::new(FileStorage::in_dir(&dir));
    assert_eq!(
        reopened.restore().await.identity().unwrap().subject,
        READER_EMAIL
    );
    reopened.logout().await.unwrap();

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn test_register_then_login() {
    let backend = StubBackend::start().await;
    let gateway = backend.gateway();

    let form = RegisterForm {
        name: "Budi Santoso".to_string(),
        email: "budi@libris.test".to_string(),
        password: SecretString::from("long-enough"),
    };
    let nav = form.submit(&gateway).await.unwrap();
    assert_eq!(nav.route, Route::Login);
    assert_eq!(nav.notice, Some(Notice::Registered));

    // Same email again is refused by the backend
    let err = form.submit(&gateway).await.unwrap_err();
    assert_eq!(err.user_message("fallback"), "Email already registered");

    let session = Session::new(MemoryStorage::new());
    session.restore().await;
    let gateway = gateway.for_session(session.handle());
    login_form("budi@libris.test", "long-enough")
        .submit(&session, &gateway)
        .await
        .unwrap();
    assert!(session.state().await.is_authenticated());
}

#[tokio::test]
async fn test_short_password_is_not_sent() {
    let backend = StubBackend::start().await;
    let form = RegisterForm {
        name: "Citra".to_string(),
        email: "citra@libris.test".to_string(),
        password: SecretString::from("short"),
    };
    assert!(matches!(
        form.submit(&backend.gateway()).await,
        Err(SubmitError::Invalid(_))
    ));
    assert!(!backend.received("POST /auth/register"));
}
