//! Login and registration forms.

use libris_core::validation::{require, require_password};
use libris_core::{Email, Registration, ValidationError};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use super::{Navigation, Notice, SubmitError};
use crate::gateway::Gateway;
use crate::routes::Route;
use crate::session::Session;
use crate::storage::Storage;

/// Shown when login fails without a backend explanation.
pub const LOGIN_FAILED: &str = "Incorrect email or password.";

/// Shown when registration fails without a backend explanation.
pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

impl LoginForm {
    /// Both fields are required. The email is not syntax-checked here; the
    /// backend is the judge of which accounts exist.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for an empty field.
    pub fn validate(&self) -> Result<&str, ValidationError> {
        let email = require("email", &self.email)?;
        if self.password.expose_secret().is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(email)
    }

    /// Sign in and go to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] without contacting the backend when a
    /// field is empty, otherwise the session error.
    pub async fn submit<S: Storage>(
        &self,
        session: &Session<S>,
        gateway: &Gateway,
    ) -> Result<Navigation, SubmitError> {
        let email = self.validate()?;
        session.login(gateway, email, &self.password).await?;
        Ok(Navigation::to(Route::Home))
    }
}

#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

impl RegisterForm {
    /// All fields are required; the password needs at least eight characters.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        let name = require("name", &self.name)?.to_owned();
        require("email", &self.email)?;
        let email = Email::parse(&self.email)?;
        require_password(self.password.expose_secret())?;
        Ok(Registration {
            name,
            email,
            password: self.password.clone(),
        })
    }

    /// Create the account and send the user to the login page.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Invalid`] without contacting the backend when a
    /// field is invalid, otherwise the gateway error.
    pub async fn submit(&self, gateway: &Gateway) -> Result<Navigation, SubmitError> {
        let registration = self.validate()?;
        let profile = gateway.register(&registration).await?;
        info!(user_id = %profile.id, "Account registered");
        Ok(Navigation::with_notice(Route::Login, Notice::Registered))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn register(name: &str, email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            name: name.to_owned(),
            email: email.to_owned(),
            password: SecretString::from(password),
        }
    }

    #[test]
    fn test_login_requires_both_fields() {
        let form = LoginForm {
            email: " ".to_owned(),
            password: SecretString::from("secret"),
        };
        assert_eq!(form.validate(), Err(ValidationError::MissingField("email")));

        let form = LoginForm {
            email: "a@b.co".to_owned(),
            password: SecretString::from(""),
        };
        assert_eq!(form.validate(), Err(ValidationError::MissingField("password")));
    }

    #[test]
    fn test_register_validation() {
        assert!(register("Ayu", "ayu@example.com", "long enough").validate().is_ok());
        assert_eq!(
            register("", "ayu@example.com", "long enough").validate().unwrap_err(),
            ValidationError::MissingField("name")
        );
        assert_eq!(
            register("Ayu", "", "long enough").validate().unwrap_err(),
            ValidationError::MissingField("email")
        );
        assert!(matches!(
            register("Ayu", "not-an-email", "long enough").validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert_eq!(
            register("Ayu", "ayu@example.com", "short").validate().unwrap_err(),
            ValidationError::PasswordTooShort { min: 8 }
        );
    }
}
