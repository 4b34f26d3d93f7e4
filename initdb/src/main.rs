//! Brings the site database schema up to date.
//!
//! Migrations are read from `SITE_MIGRATIONS_DIR`, or `./migrations` when
//! that is unset.

use std::env;

use movine::Movine;
use postgres::{Client, NoTls};

use log::{debug, info, initialize_logger, Logger};

const DEFAULT_MIGRATIONS_DIR: &str = "./migrations";

fn connect(logger: &Logger) -> Client {
    let connection_string = env::var("SITE_DB_CONNECTION_STRING")
        .expect("could not read SITE_DB_CONNECTION_STRING");

    debug!(logger, "Connecting to database...");
    Client::connect(&connection_string, NoTls).expect("could not connect to database")
}

fn main() {
    dotenv::dotenv().ok();

    let logger = initialize_logger();
    let migrations_dir =
        env::var("SITE_MIGRATIONS_DIR").unwrap_or_else(|_| DEFAULT_MIGRATIONS_DIR.to_owned());

    let mut movine = Movine::new(connect(&logger));
    movine.set_migration_dir(&migrations_dir);

    // movine keeps its own bookkeeping table, which a fresh database lacks
    if movine.status().is_err() {
        info!(logger, "Initializing migration table...");
        movine.initialize().expect("failed to initialize movine");
    }

    info!(logger, "Running migrations..."; "dir" => &migrations_dir);
    movine.up().expect("failed to run migrations");

    info!(logger, "Database is up to date.");
}
