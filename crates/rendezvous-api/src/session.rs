// Account and session endpoints
//
// Login, registration, logout, session check, collection sharing and the
// password flows. None of these touch the token store: persisting the
// token returned by `login` is the caller's job.

use reqwest::Method;
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::debug;

use crate::auth::{AuthStrategy, Credentials, Registration};
use crate::client::BackendClient;
use crate::error::Error;
use crate::models::{LoginResponse, UserProfile, Visibility};

impl BackendClient {
    /// Exchange credentials for an access token and profile.
    ///
    /// `POST /api/login`
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, Error> {
        let url = self.url(&["api", "login"])?;
        debug!(email = %credentials.email, "logging in");
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        self.send(self.request(Method::POST, url, AuthStrategy::Anonymous)?.json(&body))
            .await
    }

    /// Create an account. The new user still has to log in.
    ///
    /// `POST /api/register`
    pub async fn register(&self, registration: &Registration) -> Result<(), Error> {
        let url = self.url(&["api", "register"])?;
        let body = json!({
            "username": registration.username,
            "email": registration.email,
            "password": registration.password.expose_secret(),
        });
        self.send_empty(self.request(Method::POST, url, AuthStrategy::Anonymous)?.json(&body))
            .await
    }

    /// Best-effort server-side logout.
    ///
    /// `POST /logout`
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.url(&["logout"])?;
        self.send_empty(self.request(Method::POST, url, AuthStrategy::Bearer)?)
            .await
    }

    /// The account behind the current token. Fails with
    /// [`Error::Authentication`] when the token is missing or expired.
    ///
    /// `GET /api/user`
    pub async fn current_user(&self) -> Result<UserProfile, Error> {
        let url = self.url(&["api", "user"])?;
        self.send(self.request(Method::GET, url, AuthStrategy::Bearer)?)
            .await
    }

    /// Toggle whether the collection is publicly shared.
    ///
    /// `POST /api/changepublicvisibility`
    pub async fn change_public_visibility(&self) -> Result<(), Error> {
        let url = self.url(&["api", "changepublicvisibility"])?;
        self.send_empty(self.request(Method::POST, url, AuthStrategy::Bearer)?)
            .await
    }

    /// `GET /api/getpublicvisibility`
    pub async fn public_visibility(&self) -> Result<Visibility, Error> {
        let url = self.url(&["api", "getpublicvisibility"])?;
        self.send(self.request(Method::GET, url, AuthStrategy::Bearer)?)
            .await
    }

    /// `POST /api/passwordchange`
    pub async fn change_password(
        &self,
        old_password: &secrecy::SecretString,
        new_password: &secrecy::SecretString,
    ) -> Result<(), Error> {
        let url = self.url(&["api", "passwordchange"])?;
        let body = json!({
            "oldpassword": old_password.expose_secret(),
            "newpassword": new_password.expose_secret(),
        });
        self.send_empty(self.request(Method::POST, url, AuthStrategy::Bearer)?.json(&body))
            .await
    }

    /// Ask the backend to email a password-reset link.
    ///
    /// `POST /api/forgetpassword`
    pub async fn forgot_password(&self, email: &str) -> Result<(), Error> {
        let url = self.url(&["api", "forgetpassword"])?;
        let body = json!({ "email": email });
        self.send_empty(self.request(Method::POST, url, AuthStrategy::Anonymous)?.json(&body))
            .await
    }

    /// `POST /api/reset-password`
    pub async fn reset_password(
        &self,
        token: &str,
        password: &secrecy::SecretString,
    ) -> Result<(), Error> {
        let url = self.url(&["api", "reset-password"])?;
        let body = json!({
            "token": token,
            "password": password.expose_secret(),
        });
        self.send_empty(self.request(Method::POST, url, AuthStrategy::Anonymous)?.json(&body))
            .await
    }

    /// Check that a password-reset token is still valid.
    ///
    /// `POST /api/verify-reset-token/`
    pub async fn verify_reset_token(&self, token: &str) -> Result<(), Error> {
        let url = self.url(&["api", "verify-reset-token", ""])?;
        let body = json!({ "token": token });
        self.send_empty(self.request(Method::POST, url, AuthStrategy::Anonymous)?.json(&body))
            .await
    }
}
