use std::sync::Arc;

use log::Logger;

use crate::auth::Authenticator;
use crate::db::Db;
use crate::images::ImageChecker;
use crate::store::Store;

#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db + Send + Sync>,
    pub store: Arc<dyn Store>,
    pub auth: Arc<dyn Authenticator>,
    pub images: Arc<dyn ImageChecker>,
    pub config: Config,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db + Send + Sync>,
        store: Arc<dyn Store>,
        auth: Arc<dyn Authenticator>,
        images: Arc<dyn ImageChecker>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            db,
            store,
            auth,
            images,
            config,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Name of the cookie that carries the session token.
    pub(crate) session_cookie: String,

    /// Whether cookies are marked `Secure`.
    pub(crate) secure_cookies: bool,

    /// Largest accepted image upload, in bytes.
    pub(crate) max_upload_bytes: u64,
}

impl Config {
    pub fn new(session_cookie: String, secure_cookies: bool, max_upload_bytes: u64) -> Self {
        Self {
            session_cookie,
            secure_cookies,
            max_upload_bytes,
        }
    }
}
