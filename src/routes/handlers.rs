use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use log::{debug, info, o};
use serde::Deserialize;
use uuid::Uuid;
use warp::{
    filters::multipart::FormData,
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::auth::{clear_session_cookie, session_cookie, session_token, Credentials, User};
use crate::db::Db;
use crate::environment::Environment;
use crate::errors::BackendError;
use crate::images::{extension_for, verify_remote_image};
use crate::io::parse_image_upload;
use crate::resources::{from_row, to_row, Event, Fields, Resource};
use crate::routes::{
    query::IdQuery,
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::schedule::categorize_now;

const SERVER_TIMING_HEADER: &str = "server-timing";
const SET_COOKIE_HEADER: &str = "set-cookie";

type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)*) => {{
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($body)* };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

/// The body of an update: the id of the record plus the fields to change.
#[derive(Debug, Deserialize)]
struct Changes<F> {
    #[serde(default)]
    id: Option<String>,

    #[serde(flatten)]
    fields: F,
}

#[derive(Debug, Deserialize)]
struct UrlSubmission {
    url: String,
}

pub async fn list<R: Resource>(environment: Environment) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::list(R::TABLE.name()), e);

        let rows = environment.db.list(R::TABLE).await.map_err(error_handler)?;

        let records = rows
            .into_iter()
            .map(from_row::<R>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(error_handler)?;

        json(&records)
    }
}

pub async fn create<R: Resource>(environment: Environment, user: User, body: Bytes) -> RouteResult {
    timed! {
        let resource = R::TABLE.name();
        let error_handler = |e: BackendError| Rejection::new(Context::create(resource), e);
        let logger = environment.logger.new(o!("resource" => resource, "user" => user.id));

        let fields: R::Fields = parse_body(&body).map_err(error_handler)?;

        debug!(logger, "Inserting record...");
        let record: R = insert_record(environment.db.clone(), fields)
            .await
            .map_err(error_handler)?;

        with_status(json(&record), StatusCode::CREATED)
    }
}

pub async fn update<R: Resource>(environment: Environment, user: User, body: Bytes) -> RouteResult {
    timed! {
        let resource = R::TABLE.name();
        let logger = environment.logger.new(o!("resource" => resource, "user" => user.id));

        let changes: Changes<R::Fields> = parse_body(&body)
            .map_err(|e| Rejection::new(Context::update(resource, None), e))?;
        let Changes { id, fields } = changes;

        let error_handler = |e: BackendError| Rejection::new(Context::update(resource, id.clone()), e);

        let id = parse_id(id.as_deref()).map_err(&error_handler)?;
        let logger = logger.new(o!("id" => id.to_string()));

        debug!(logger, "Updating record...");
        let record: R = update_record(environment.db.clone(), &id, fields)
            .await
            .map_err(&error_handler)?;

        json(&record)
    }
}

pub async fn delete<R: Resource>(environment: Environment, user: User, query: IdQuery) -> RouteResult {
    timed! {
        let resource = R::TABLE.name();
        let error_handler = |e: BackendError| Rejection::new(Context::delete(resource, query.id.clone()), e);

        let id = parse_id(query.id.as_deref()).map_err(&error_handler)?;
        info!(environment.logger, "Deleting record..."; "resource" => resource, "id" => id.to_string(), "user" => &user.id);

        environment
            .db
            .delete(R::TABLE, &id)
            .await
            .map_err(&error_handler)?;

        json(&SuccessResponse::Success { success: true })
    }
}

pub async fn schedule(environment: Environment) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::schedule(), e);

        let rows = environment.db.list(Event::TABLE).await.map_err(error_handler)?;

        let events = rows
            .into_iter()
            .map(from_row::<Event>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(error_handler)?;

        json(&categorize_now(events))
    }
}

pub async fn upload(environment: Environment, user: User, content: FormData) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::upload(), e);
        let logger = environment.logger.new(o!("user" => user.id));

        debug!(logger, "Parsing submission...");
        let upload = parse_image_upload(content).await.map_err(error_handler)?;

        let key = match extension_for(&upload.content_type) {
            Some(extension) => format!("images/{}.{}", Uuid::new_v4(), extension),
            None => format!("images/{}", Uuid::new_v4()),
        };

        debug!(logger, "Saving image to store..."; "key" => &key, "file_name" => ?upload.file_name, "size" => upload.data.len());
        let url = environment
            .store
            .save(&key, upload.content_type.to_string(), upload.data)
            .await
            .map_err(error_handler)?;

        with_status(json(&SuccessResponse::Uploaded { url }), StatusCode::CREATED)
    }
}

pub async fn import_url(environment: Environment, user: User, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::import_url(), e);
        let logger = environment.logger.new(o!("user" => user.id));

        let submission: UrlSubmission = parse_body(&body).map_err(error_handler)?;

        debug!(logger, "Checking remote image..."; "url" => &submission.url);
        let url = verify_remote_image(environment.images.as_ref(), &submission.url)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Uploaded { url })
    }
}

pub async fn login(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::login(), e);

        let credentials: Credentials = parse_body(&body).map_err(error_handler)?;

        let session = environment
            .auth
            .sign_in(credentials)
            .await
            .map_err(error_handler)?;
        info!(environment.logger, "Signed in"; "user" => &session.user.id);

        let cookie = session_cookie(
            &environment.config.session_cookie,
            &session.access_token,
            session.expires_in,
            environment.config.secure_cookies,
        );

        with_header(
            json(&SuccessResponse::SignedIn { user: session.user }),
            SET_COOKIE_HEADER,
            cookie,
        )
    }
}

pub async fn logout(environment: Environment, cookie: Option<String>) -> RouteResult {
    timed! {
        let name = &environment.config.session_cookie;

        if let Some(token) = cookie.as_deref().and_then(|header| session_token(header, name)) {
            environment
                .auth
                .sign_out(token)
                .await
                .map_err(|e| Rejection::new(Context::logout(), e))?;
        }

        with_header(
            json(&SuccessResponse::Success { success: true }),
            SET_COOKIE_HEADER,
            clear_session_cookie(name),
        )
    }
}

pub async fn session(_environment: Environment, user: User) -> RouteResult {
    timed! {
        json(&SuccessResponse::SignedIn { user })
    }
}

/// Resolves the session cookie in `cookie` to a user.
pub(crate) async fn authenticate(
    environment: Environment,
    cookie: Option<String>,
) -> Result<User, BackendError> {
    let token = cookie
        .as_deref()
        .and_then(|header| session_token(header, &environment.config.session_cookie))
        .ok_or(BackendError::Unauthorized)?;

    environment
        .auth
        .verify(token)
        .await?
        .ok_or(BackendError::Unauthorized)
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, BackendError> {
    serde_json::from_slice(body).map_err(BackendError::MalformedBody)
}

fn parse_id(raw: Option<&str>) -> Result<Uuid, BackendError> {
    let raw = raw.ok_or(BackendError::MissingId)?;

    Uuid::parse_str(raw).map_err(|_| BackendError::InvalidId(raw.to_owned()))
}

async fn insert_record<R: Resource>(
    db: Arc<dyn Db + Send + Sync>,
    mut fields: R::Fields,
) -> Result<R, BackendError> {
    let missing = fields.missing();
    if !missing.is_empty() {
        return Err(BackendError::MissingFields(missing));
    }

    fields.prepare()?;

    let row = db.insert(R::TABLE, to_row(&fields)?).await?;

    from_row(row)
}

async fn update_record<R: Resource>(
    db: Arc<dyn Db + Send + Sync>,
    id: &Uuid,
    mut fields: R::Fields,
) -> Result<R, BackendError> {
    fields.prepare()?;

    let row = db
        .update(R::TABLE, id, to_row(&fields)?)
        .await?
        .ok_or(BackendError::NonExistentId(*id))?;

    from_row(row)
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
