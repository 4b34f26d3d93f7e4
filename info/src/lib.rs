//! Build metadata baked in at compile time.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Source control revision, if `SITE_REVISION` was set during the build.
pub const REVISION: Option<&str> = option_env!("SITE_REVISION");

/// Set by the deployment pipeline.
pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");
