use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use tokio::sync::mpsc;
use warp::Filter;

use log::info;
use site_backend::auth::HostedAuth;
use site_backend::config::{get_variable, get_variable_or};
use site_backend::db::PgDb;
use site_backend::environment::{Config, Environment};
use site_backend::images::HttpImageChecker;
use site_backend::routes;
use site_backend::store::S3Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    #[cfg(not(feature = "env_logging"))]
    let logger = log::initialize_logger();
    #[cfg(feature = "env_logging")]
    let (logger, _guard) = log::initialize_env_logger();

    let store = Arc::new(S3Store::from_env().expect("initialize S3 store from environment"));
    let auth = Arc::new(HostedAuth::from_env());
    let images = Arc::new(HttpImageChecker::new(reqwest::Client::new()));

    let main_port: u16 = get_variable("SITE_PORT")
        .parse()
        .expect("parse SITE_PORT as u16");
    let admin_port: u16 = get_variable("SITE_ADMIN_PORT")
        .parse()
        .expect("parse SITE_ADMIN_PORT as u16");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool...");
    let connection_string = get_variable("SITE_DB_CONNECTION_STRING");
    let pool = sqlx::PgPool::connect(&connection_string)
        .await
        .expect("create database pool from SITE_DB_CONNECTION_STRING");
    let db = Arc::new(PgDb::new(pool));

    let config = Config::new(
        get_variable_or("SITE_SESSION_COOKIE", "site_session"),
        get_variable_or("SITE_SECURE_COOKIES", "1") == "1",
        get_variable_or("SITE_MAX_UPLOAD_BYTES", "10485760")
            .parse()
            .expect("parse SITE_MAX_UPLOAD_BYTES as u64"),
    );
    let environment = Environment::new(logger.clone(), db, store, auth, images, config);

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate = Arc::new(move || {
        let termination_sender = termination_sender.clone();

        async move {
            // the receiver only goes away once shutdown has begun
            let _ = termination_sender.send(()).await;
        }
        .boxed()
    });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::make_api_routes(environment);

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::admin::make_healthz_route()
            .or(routes::admin::make_termination_route(terminate));

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
