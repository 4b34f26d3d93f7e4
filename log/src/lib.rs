use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Logger};

/// Creates the root logger. Every record is written to stderr as a
/// single JSON line tagged with the build metadata.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().fuse();

    Logger::root(drain, build_metadata())
}

/// Creates a root logger that filters through `RUST_LOG`, for local
/// debugging. The returned guard must be kept alive.
#[cfg(feature = "env_logging")]
pub fn initialize_env_logger() -> (Logger, slog_scope::GlobalLoggerGuard) {
    let guard = slog_envlogger::init().expect("initialize slog-envlogger");

    (slog_scope::logger().new(build_metadata()), guard)
}

/// A logger that drops everything.
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}

fn build_metadata() -> slog::OwnedKV<impl slog::SendSyncRefUnwindSafeKV> {
    o!(
        "version" => info::VERSION,
        "revision" => info::REVISION,
        "build_timestamp" => info::BUILD_TIMESTAMP
    )
}
