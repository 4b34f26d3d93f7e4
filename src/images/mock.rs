use std::collections::HashMap;
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};
use mime::Mime;
use url::Url;

use crate::errors::BackendError;
use crate::images::ImageChecker;

/// Answers only for URLs registered with [`MockImageChecker::serve`].
#[derive(Default)]
pub(crate) struct MockImageChecker {
    served: RwLock<HashMap<String, Mime>>,
}

impl MockImageChecker {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn serve(&self, url: &str, mime: Mime) {
        self.served
            .write()
            .unwrap()
            .insert(Url::parse(url).unwrap().to_string(), mime);
    }
}

impl ImageChecker for MockImageChecker {
    fn content_type(&self, url: &Url) -> BoxFuture<Result<Option<Mime>, BackendError>> {
        let found = self.served.read().unwrap().get(url.as_str()).cloned();

        async move { Ok(found) }.boxed()
    }
}
