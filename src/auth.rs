use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::BackendError;

#[cfg(test)]
pub(crate) mod mock;

/// The signed-in administrator.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Session {
    pub access_token: String,

    /// Lifetime of `access_token` in seconds.
    pub expires_in: u64,

    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The identity provider that issues and checks session tokens.
pub trait Authenticator: Send + Sync {
    /// Exchanges an email and password for a session.
    fn sign_in(&self, credentials: Credentials) -> BoxFuture<Result<Session, BackendError>>;

    /// Resolves a session token to its user. Returns `None` for tokens the
    /// provider no longer accepts.
    fn verify(&self, token: &str) -> BoxFuture<Result<Option<User>, BackendError>>;

    /// Revokes the session behind `token`.
    fn sign_out(&self, token: &str) -> BoxFuture<Result<(), BackendError>>;
}

/// Talks to a GoTrue-compatible auth service over HTTP.
pub struct HostedAuth {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HostedAuth {
    pub fn new(client: Client, mut base_url: Url, api_key: String) -> Self {
        // `Url::join` drops the last segment unless the path ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        HostedAuth {
            client,
            base_url,
            api_key,
        }
    }

    pub fn from_env() -> Self {
        use crate::config::get_variable;

        let base_url = Url::parse(&get_variable("SITE_AUTH_URL")).expect("parse SITE_AUTH_URL");

        HostedAuth::new(Client::new(), base_url, get_variable("SITE_AUTH_API_KEY"))
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|source| BackendError::FailedToGenerateUrl { source })
    }
}

fn provider_error(source: reqwest::Error) -> BackendError {
    BackendError::AuthProvider { source }
}

impl Authenticator for HostedAuth {
    fn sign_in(&self, credentials: Credentials) -> BoxFuture<Result<Session, BackendError>> {
        async move {
            let url = self.endpoint("token?grant_type=password")?;

            let response = self
                .client
                .post(url)
                .header("apikey", &self.api_key)
                .json(&serde_json::json!({
                    "email": credentials.email,
                    "password": credentials.password,
                }))
                .send()
                .await
                .map_err(provider_error)?;

            match response.status() {
                s if s.is_success() => response.json().await.map_err(provider_error),
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                    Err(BackendError::InvalidCredentials)
                }
                s => Err(BackendError::AuthProviderStatus(s.as_u16())),
            }
        }
        .boxed()
    }

    fn verify(&self, token: &str) -> BoxFuture<Result<Option<User>, BackendError>> {
        let token = token.to_owned();

        async move {
            let url = self.endpoint("user")?;

            let response = self
                .client
                .get(url)
                .header("apikey", &self.api_key)
                .bearer_auth(token)
                .send()
                .await
                .map_err(provider_error)?;

            match response.status() {
                s if s.is_success() => Ok(Some(response.json().await.map_err(provider_error)?)),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
                s => Err(BackendError::AuthProviderStatus(s.as_u16())),
            }
        }
        .boxed()
    }

    fn sign_out(&self, token: &str) -> BoxFuture<Result<(), BackendError>> {
        let token = token.to_owned();

        async move {
            let url = self.endpoint("logout")?;

            let response = self
                .client
                .post(url)
                .header("apikey", &self.api_key)
                .bearer_auth(token)
                .send()
                .await
                .map_err(provider_error)?;

            match response.status() {
                // an already revoked token is as good as signed out
                s if s.is_success() => Ok(()),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(()),
                s => Err(BackendError::AuthProviderStatus(s.as_u16())),
            }
        }
        .boxed()
    }
}

/// Builds a `Set-Cookie` header value that stores the session token.
pub fn session_cookie(name: &str, token: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };

    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        name, token, max_age, secure
    )
}

/// Builds a `Set-Cookie` header value that removes the session cookie.
pub fn clear_session_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

/// Finds the session token in a `Cookie` header.
pub fn session_token<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            Some((parts.next()?, parts.next()?))
        })
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookies_round_trip_through_headers() {
        let set = session_cookie("site_session", "abc.def", 3600, true);
        assert_eq!(
            set,
            "site_session=abc.def; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600; Secure"
        );

        let header = "theme=dark; site_session=abc.def; other=1";
        assert_eq!(session_token(header, "site_session"), Some("abc.def"));
    }

    #[test]
    fn similar_cookie_names_are_not_confused() {
        assert_eq!(session_token("site_session_old=x", "site_session"), None);
        assert_eq!(session_token("site_session=", "site_session"), None);
        assert_eq!(session_token("", "site_session"), None);
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        assert!(clear_session_cookie("site_session").ends_with("Max-Age=0"));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let auth = HostedAuth::new(
            Client::new(),
            Url::parse("https://auth.example.com/auth/v1").unwrap(),
            "key".to_owned(),
        );

        assert_eq!(
            auth.endpoint("user").unwrap().as_str(),
            "https://auth.example.com/auth/v1/user"
        );
    }
}
