use std::sync::Arc;

use log::{error, warn, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};

use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod query;
mod rejection;
mod response;


pub use internal::*;

/// The largest JSON body accepted by the write routes.
const MAX_BODY_LENGTH: u64 = 64 * 1024;

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        let status = status_code_for(e);

        if status.is_server_error() {
            error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status, "message" => %r.error);
        } else {
            warn!(logger, "Request refused"; "context" => ?r.context, "status" => %status, "message" => %r.error);
        }

        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status));
    }

    Err(rej)
}

pub(crate) fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        InvalidValue(..)
        | DuplicateKey
        | MissingFields(..)
        | MissingId
        | InvalidId(..)
        | NothingToWrite
        | InvalidDate(..)
        | MalformedBody(..)
        | PartsMissing
        | MalformedFormSubmission
        | NotAnImage(..)
        | InvalidUrl(..)
        | UnreachableImage { .. } => StatusCode::BAD_REQUEST,
        Unauthorized | InvalidCredentials => StatusCode::UNAUTHORIZED,
        NonExistentId(..) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use std::convert::Infallible;
    use std::sync::Arc;

    use bytes::Bytes;
    use warp::filters::multipart::form;
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::{delete, get as g, path as p, post, put, query, reject};
    use warp::{Filter, Reply};

    use super::rejection::{Context, Rejection};
    use super::{handlers, query as q, MAX_BODY_LENGTH};
    use crate::auth::User;
    use crate::environment::Environment;
    use crate::resources::{Event, GalleryImage, HeroSlide, Mix, Resource, SiteContent, Video};

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    // Matching filters come first so that a refused session never
    // shadows a plain "not found".
    macro_rules! route {
    ($name:ident => $handler:ident $(, session($context:expr))?; $($filters:expr),+ $(; $($extract:expr),+)?) => (
        pub fn $name(environment: Environment) -> Route {
            let route = warp::any();
            route_filter!(route; $($filters),+);

            let route = route.and(with_environment(environment.clone()));
            $( let route = route.and(require_session(environment.clone(), $context)); )?
            $( route_filter!(route; $($extract),+); )?

            route.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    fn with_environment(
        environment: Environment,
    ) -> impl Filter<Extract = (Environment,), Error = Infallible> + Clone {
        warp::any().map(move || environment.clone())
    }

    fn body() -> impl Filter<Extract = (Bytes,), Error = reject::Rejection> + Clone {
        warp::body::content_length_limit(MAX_BODY_LENGTH).and(warp::body::bytes())
    }

    fn cookie() -> impl Filter<Extract = (Option<String>,), Error = reject::Rejection> + Clone {
        warp::header::optional::<String>("cookie")
    }

    /// Resolves the session cookie to the signed-in user, refusing the
    /// request with `context` otherwise.
    pub fn require_session(
        environment: Environment,
        context: Context,
    ) -> impl Filter<Extract = (User,), Error = reject::Rejection> + Clone {
        with_environment(environment)
            .and(cookie())
            .and_then(move |environment: Environment, cookie: Option<String>| {
                let context = context.clone();

                async move {
                    handlers::authenticate(environment, cookie)
                        .await
                        .map_err(|e| reject::Rejection::from(Rejection::new(context, e)))
                }
            })
    }

    /// Builds the list, create, update and delete routes of a resource.
    pub fn make_resource_routes<R: Resource>(environment: Environment) -> Route {
        let segment = R::TABLE.segment();
        let resource = R::TABLE.name();

        let list = p(segment)
            .and(end())
            .and(g())
            .and(with_environment(environment.clone()))
            .and_then(handlers::list::<R>);

        let create = p(segment)
            .and(end())
            .and(post())
            .and(with_environment(environment.clone()))
            .and(require_session(environment.clone(), Context::create(resource)))
            .and(body())
            .and_then(handlers::create::<R>);

        let update = p(segment)
            .and(end())
            .and(put())
            .and(with_environment(environment.clone()))
            .and(require_session(environment.clone(), Context::update(resource, None)))
            .and(body())
            .and_then(handlers::update::<R>);

        let remove = p(segment)
            .and(end())
            .and(delete())
            .and(with_environment(environment.clone()))
            .and(require_session(environment.clone(), Context::delete(resource, None)))
            .and(query::<q::IdQuery>())
            .and_then(handlers::delete::<R>);

        list.or(create)
            .unify()
            .or(update)
            .unify()
            .or(remove)
            .unify()
            .boxed()
    }

    pub fn make_upload_route(environment: Environment) -> Route {
        let max_length = environment.config.max_upload_bytes;

        p("upload")
            .and(end())
            .and(post())
            .and(with_environment(environment.clone()))
            .and(require_session(environment, Context::upload()))
            .and(form().max_length(max_length))
            .and_then(handlers::upload)
            .boxed()
    }

    route!(make_schedule_route => schedule; p("events"), p("schedule"), end(), g());
    route!(make_import_url_route => import_url, session(Context::import_url()); p("upload"), p("url"), end(), post(); body());
    route!(make_login_route => login; p("auth"), p("login"), end(), post(); body());
    route!(make_logout_route => logout; p("auth"), p("logout"), end(), post(); cookie());
    route!(make_session_route => session, session(Context::session()); p("auth"), p("session"), end(), g());

    /// Every route under `/api`, with errors rendered as JSON.
    pub fn make_api_routes(
        environment: Environment,
    ) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
        let logger = Arc::clone(&environment.logger);

        let routes = make_schedule_route(environment.clone())
            .or(make_resource_routes::<Event>(environment.clone()))
            .unify()
            .or(make_resource_routes::<GalleryImage>(environment.clone()))
            .unify()
            .or(make_resource_routes::<HeroSlide>(environment.clone()))
            .unify()
            .or(make_resource_routes::<Mix>(environment.clone()))
            .unify()
            .or(make_resource_routes::<SiteContent>(environment.clone()))
            .unify()
            .or(make_resource_routes::<Video>(environment.clone()))
            .unify()
            .or(make_upload_route(environment.clone()))
            .unify()
            .or(make_import_url_route(environment.clone()))
            .unify()
            .or(make_login_route(environment.clone()))
            .unify()
            .or(make_logout_route(environment.clone()))
            .unify()
            .or(make_session_route(environment))
            .unify();

        p("api")
            .and(routes)
            .recover(move |r| super::format_rejection(logger.clone(), r))
    }
}
