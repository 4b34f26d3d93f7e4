use bytes::BufMut;
use futures::stream::TryStreamExt;
use mime::Mime;
use warp::multipart::{FormData, Part};

use crate::errors::BackendError;

/// The form field that carries the uploaded image.
const FILE_PART: &str = "file";

/// An image submitted through a multipart form.
#[derive(Debug)]
pub struct ImageUpload {
    pub content_type: Mime,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

/// Collects the chunks of a [`Part`] into one buffer.
pub async fn part_as_vec(part: Part) -> Result<Vec<u8>, BackendError> {
    part.stream()
        .try_fold(Vec::new(), |mut data, chunk| async move {
            data.put(chunk);
            Ok(data)
        })
        .await
        .map_err(|_| BackendError::MalformedFormSubmission)
}

/// Extracts the `file` part of an upload form. Only images are accepted.
///
/// Parts are read in arrival order; the body of a part is only available
/// until the next one is requested.
pub async fn parse_image_upload(mut form: FormData) -> Result<ImageUpload, BackendError> {
    while let Some(part) = form
        .try_next()
        .await
        .map_err(|_| BackendError::MalformedFormSubmission)?
    {
        if part.name() != FILE_PART {
            continue;
        }

        let declared = part.content_type().unwrap_or_default().to_owned();
        let content_type: Mime = declared
            .parse()
            .map_err(|_| BackendError::NotAnImage(declared.clone()))?;

        if content_type.type_() != mime::IMAGE {
            return Err(BackendError::NotAnImage(declared));
        }

        let file_name = part.filename().map(str::to_owned);
        let data = part_as_vec(part).await?;

        return Ok(ImageUpload {
            content_type,
            file_name,
            data,
        });
    }

    Err(BackendError::PartsMissing)
}
