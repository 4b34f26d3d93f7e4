pub mod auth;
pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod images;
pub mod io;
pub mod normalization;
pub mod resources;
pub mod routes;
pub mod schedule;
pub mod store;
