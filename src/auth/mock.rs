use std::collections::HashMap;
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};

use crate::auth::{Authenticator, Credentials, Session, User};
use crate::errors::BackendError;

pub(crate) const TOKEN: &str = "valid-token";

/// Accepts a single email and password and hands out [`TOKEN`].
pub(crate) struct MockAuth {
    email: String,
    password: String,
    pub(crate) sessions: RwLock<HashMap<String, User>>,
}

impl MockAuth {
    pub fn new(email: &str, password: &str) -> Self {
        MockAuth {
            email: email.to_owned(),
            password: password.to_owned(),
            sessions: Default::default(),
        }
    }

    /// Starts with [`TOKEN`] already signed in.
    pub fn signed_in(email: &str, password: &str) -> Self {
        let auth = Self::new(email, password);
        auth.sessions
            .write()
            .unwrap()
            .insert(TOKEN.to_owned(), auth.user());
        auth
    }

    fn user(&self) -> User {
        User {
            id: "00000000-0000-0000-0000-000000000001".to_owned(),
            email: Some(self.email.clone()),
        }
    }
}

impl Authenticator for MockAuth {
    fn sign_in(&self, credentials: Credentials) -> BoxFuture<Result<Session, BackendError>> {
        async move {
            if credentials.email != self.email || credentials.password != self.password {
                return Err(BackendError::InvalidCredentials);
            }

            let user = self.user();
            self.sessions
                .write()
                .unwrap()
                .insert(TOKEN.to_owned(), user.clone());

            Ok(Session {
                access_token: TOKEN.to_owned(),
                expires_in: 3600,
                user,
            })
        }
        .boxed()
    }

    fn verify(&self, token: &str) -> BoxFuture<Result<Option<User>, BackendError>> {
        let user = self.sessions.read().unwrap().get(token).cloned();

        async move { Ok(user) }.boxed()
    }

    fn sign_out(&self, token: &str) -> BoxFuture<Result<(), BackendError>> {
        self.sessions.write().unwrap().remove(token);

        async move { Ok(()) }.boxed()
    }
}
