use rusoto_core::RusotoError;
use rusoto_s3::PutObjectError;
use thiserror::Error;
use uuid::Uuid;
use warp::reject;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents an SQL error.
    #[error("database error: {source}")]
    Sqlx { source: sqlx::Error },

    /// The database refused a value, e.g. a malformed timestamp.
    #[error("value rejected by database: {0}")]
    InvalidValue(String),

    /// A unique column already holds the submitted value.
    #[error("a record with this key already exists")]
    DuplicateKey,

    /// A stored row could not be decoded into its record type.
    #[error("malformed row: {0}")]
    MalformedRow(serde_json::Error),

    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("an id is required")]
    MissingId,

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("no record with id {0}")]
    NonExistentId(Uuid),

    #[error("no writable fields were provided")]
    NothingToWrite,

    #[error("unparseable date: {0}")]
    InvalidDate(String),

    #[error("malformed request body: {0}")]
    MalformedBody(serde_json::Error),

    /// Represents an error caused by missing parts in a form submission.
    #[error("missing file part")]
    PartsMissing,

    #[error("malformed form submission")]
    MalformedFormSubmission,

    #[error("not an image: {0}")]
    NotAnImage(String),

    #[error("invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("could not reach image: {source}")]
    UnreachableImage { source: reqwest::Error },

    #[error("upload failed: {source}")]
    UploadFailed { source: RusotoError<PutObjectError> },

    #[error("could not generate URL: {source}")]
    FailedToGenerateUrl { source: url::ParseError },

    #[error("not signed in")]
    Unauthorized,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("auth provider error: {source}")]
    AuthProvider { source: reqwest::Error },

    #[error("auth provider responded with status {0}")]
    AuthProviderStatus(u16),
}

impl reject::Reject for BackendError {}
