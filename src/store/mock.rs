use std::collections::HashMap;
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};
use url::Url;

use crate::errors::BackendError;
use crate::store::Store;

/// Keeps saved objects in memory, keyed by their store key.
pub(crate) struct MockStore {
    pub(crate) map: RwLock<HashMap<String, (String, Vec<u8>)>>,
    base_url: Url,
}

impl MockStore {
    pub fn new(base_url: &str) -> Self {
        MockStore {
            map: Default::default(),
            base_url: Url::parse(base_url).unwrap(),
        }
    }
}

impl Store for MockStore {
    fn save(
        &self,
        key: &str,
        content_type: String,
        raw: Vec<u8>,
    ) -> BoxFuture<Result<Url, BackendError>> {
        let key = key.to_owned();

        async move {
            let url = self
                .base_url
                .join(&key)
                .map_err(|source| BackendError::FailedToGenerateUrl { source })?;

            self.map.write().unwrap().insert(key, (content_type, raw));

            Ok(url)
        }
        .boxed()
    }
}
