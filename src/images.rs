use futures::future::{BoxFuture, FutureExt};
use mime::Mime;
use reqwest::{header::CONTENT_TYPE, Client};
use url::Url;

use crate::errors::BackendError;

#[cfg(test)]
pub(crate) mod mock;

const DRIVE_HOST: &str = "drive.google.com";

/// Probes a remote URL for the type of content it serves.
pub trait ImageChecker: Send + Sync {
    /// Returns the content type the URL answers with, or `None` when it
    /// does not answer successfully.
    fn content_type(&self, url: &Url) -> BoxFuture<Result<Option<Mime>, BackendError>>;
}

/// Issues `HEAD` requests.
pub struct HttpImageChecker {
    client: Client,
}

impl HttpImageChecker {
    pub fn new(client: Client) -> Self {
        HttpImageChecker { client }
    }
}

impl ImageChecker for HttpImageChecker {
    fn content_type(&self, url: &Url) -> BoxFuture<Result<Option<Mime>, BackendError>> {
        let url = url.clone();

        async move {
            let response = self
                .client
                .head(url)
                .send()
                .await
                .map_err(|source| BackendError::UnreachableImage { source })?;

            if !response.status().is_success() {
                return Ok(None);
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<Mime>().ok());

            Ok(content_type)
        }
        .boxed()
    }
}

/// Turns a Google Drive sharing link into a URL that serves the file
/// itself. Other URLs are returned unchanged.
///
/// ```
/// use url::Url;
/// use site_backend::images::direct_image_url;
///
/// let shared = Url::parse("https://drive.google.com/file/d/1AbC_d-9/view?usp=sharing").unwrap();
/// assert_eq!(
///     direct_image_url(&shared).as_str(),
///     "https://drive.google.com/uc?export=view&id=1AbC_d-9"
/// );
/// ```
pub fn direct_image_url(url: &Url) -> Url {
    if url.host_str() != Some(DRIVE_HOST) {
        return url.clone();
    }

    let from_path = url.path_segments().and_then(|mut segments| {
        match (segments.next(), segments.next(), segments.next()) {
            (Some("file"), Some("d"), Some(id)) if !id.is_empty() => Some(id.to_owned()),
            _ => None,
        }
    });

    let id = from_path.or_else(|| {
        if url.path() != "/open" {
            return None;
        }

        url.query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty())
    });

    match id {
        Some(id) => {
            let mut direct = url.clone();
            // http and https are interchangeable special schemes
            let _ = direct.set_scheme("https");
            direct.set_path("/uc");
            direct.set_query(None);
            direct.set_fragment(None);
            direct
                .query_pairs_mut()
                .append_pair("export", "view")
                .append_pair("id", &id);
            direct
        }
        None => url.clone(),
    }
}

/// File extension used when storing an image of the given type.
pub fn extension_for(mime: &Mime) -> Option<&'static str> {
    if mime.type_() != mime::IMAGE {
        return None;
    }

    match mime.subtype().as_str() {
        "jpeg" | "pjpeg" => Some("jpg"),
        "png" => Some("png"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        "avif" => Some("avif"),
        "bmp" => Some("bmp"),
        "svg" => Some("svg"),
        "tiff" => Some("tiff"),
        _ => None,
    }
}

/// Accepts a submitted image URL once the host confirms it serves an image.
pub async fn verify_remote_image(
    checker: &dyn ImageChecker,
    raw: &str,
) -> Result<Url, BackendError> {
    let url = Url::parse(raw.trim()).map_err(|_| BackendError::InvalidUrl(raw.to_owned()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(BackendError::InvalidUrl(raw.to_owned()));
    }

    let url = direct_image_url(&url);

    match checker.content_type(&url).await? {
        Some(mime) if mime.type_() == mime::IMAGE => Ok(url),
        Some(mime) => Err(BackendError::NotAnImage(mime.to_string())),
        None => Err(BackendError::NotAnImage(url.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockImageChecker;
    use super::*;

    fn parse(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn open_links_are_rewritten() {
        assert_eq!(
            direct_image_url(&parse("https://drive.google.com/open?id=XyZ")).as_str(),
            "https://drive.google.com/uc?export=view&id=XyZ"
        );
    }

    #[test]
    fn other_urls_are_left_alone() {
        for url in &[
            "https://cdn.example.com/file/d/abc/view",
            "https://drive.google.com/drive/folders/abc",
            "https://drive.google.com/open",
        ] {
            assert_eq!(direct_image_url(&parse(url)).as_str(), parse(url).as_str());
        }
    }

    #[test]
    fn extensions_follow_the_subtype() {
        assert_eq!(extension_for(&mime::IMAGE_JPEG), Some("jpg"));
        assert_eq!(extension_for(&"image/webp".parse().unwrap()), Some("webp"));
        assert_eq!(extension_for(&mime::TEXT_PLAIN), None);
    }

    #[tokio::test]
    async fn drive_links_are_checked_after_rewriting() {
        let checker = MockImageChecker::new();
        checker.serve(
            "https://drive.google.com/uc?export=view&id=abc",
            mime::IMAGE_PNG,
        );

        let url = verify_remote_image(&checker, "https://drive.google.com/file/d/abc/view")
            .await
            .unwrap();

        assert_eq!(url.as_str(), "https://drive.google.com/uc?export=view&id=abc");
    }

    #[tokio::test]
    async fn non_images_are_refused() {
        let checker = MockImageChecker::new();
        checker.serve("https://example.com/page", mime::TEXT_HTML);

        match verify_remote_image(&checker, "https://example.com/page").await {
            Err(BackendError::NotAnImage(kind)) => assert_eq!(kind, "text/html"),
            other => panic!("expected NotAnImage, got {:?}", other),
        }

        match verify_remote_image(&checker, "https://example.com/missing.jpg").await {
            Err(BackendError::NotAnImage(_)) => {}
            other => panic!("expected NotAnImage, got {:?}", other),
        }

        match verify_remote_image(&checker, "ftp://example.com/a.jpg").await {
            Err(BackendError::InvalidUrl(_)) => {}
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }
}
