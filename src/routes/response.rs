use serde::Serialize;
use url::Url;

use crate::auth::User;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
    SignedIn {
        user: User,
    },
    Success {
        success: bool,
    },
    Uploaded {
        url: Url,
    },
}
