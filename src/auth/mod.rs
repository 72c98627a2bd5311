//! Authentication against the Franklin API.
//!
//! The service issues a bearer token from `GET {api_root}/auth/login`. The
//! token is fetched once when the [`Authenticator`] is built and attached to
//! every later request through the [`RequestSigner`] trait. There is no
//! refresh: a token that expires server-side shows up as an HTTP error on the
//! next call.

mod credentials;

pub use credentials::{Credentials, SessionToken};

use crate::types::{LoginParams, LoginResponse};
use crate::{Error, Result};
use reqwest::{Client, RequestBuilder};

/// Decorates outgoing API requests with whatever the service needs to
/// accept them.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Holds the session token obtained at login.
#[derive(Debug, Clone)]
pub struct Authenticator {
    token: SessionToken,
}

impl Authenticator {
    /// Log in and keep the returned token.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for the login call
    /// * `api_root` - Versioned API root, e.g. "https://franklin.example/v1"
    /// * `credentials` - Email and password
    pub async fn login(
        client: &Client,
        api_root: &str,
        credentials: &Credentials,
    ) -> Result<Self> {
        // The login URL carries the password; keep it out of logs and errors.
        let url = format!("{}/auth/login", api_root.trim_end_matches('/'));
        tracing::debug!("logging in to {} as {}", api_root, credentials.email());

        let response = client
            .get(&url)
            .query(&LoginParams {
                email: credentials.email(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(|e| {
                Error::Authentication(format!("login request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            return Err(Error::Authentication(format!(
                "login rejected with status: {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| {
                Error::Authentication(format!(
                    "failed to read login response: {}",
                    e.without_url()
                ))
            })?;

        let login: LoginResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::Authentication(format!("login response has no token: {}", e)))?;

        tracing::info!("authenticated as {}", credentials.email());
        Ok(Self::from_token(SessionToken::new(login.token)))
    }

    /// Wrap a token obtained elsewhere.
    pub fn from_token(token: SessionToken) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }
}

impl RequestSigner for Authenticator {
    fn sign(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.token.as_str())
    }
}
