use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            error: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) error: String,
}

/// What the failed request was doing, and to which resource.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Context {
    List {
        resource: &'static str,
    },
    Create {
        resource: &'static str,
    },
    Update {
        resource: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    Delete {
        resource: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    Schedule {
        resource: &'static str,
    },
    Upload {
        resource: &'static str,
    },
    ImportUrl {
        resource: &'static str,
    },
    Login {
        resource: &'static str,
    },
    Logout {
        resource: &'static str,
    },
    Session {
        resource: &'static str,
    },
}

const IMAGES: &str = "images";
const SESSION: &str = "session";

impl Context {
    pub fn list(resource: &'static str) -> Context {
        Context::List { resource }
    }

    pub fn create(resource: &'static str) -> Context {
        Context::Create { resource }
    }

    pub fn update(resource: &'static str, id: Option<String>) -> Context {
        Context::Update { resource, id }
    }

    pub fn delete(resource: &'static str, id: Option<String>) -> Context {
        Context::Delete { resource, id }
    }

    pub fn schedule() -> Context {
        Context::Schedule { resource: "events" }
    }

    pub fn upload() -> Context {
        Context::Upload { resource: IMAGES }
    }

    pub fn import_url() -> Context {
        Context::ImportUrl { resource: IMAGES }
    }

    pub fn login() -> Context {
        Context::Login { resource: SESSION }
    }

    pub fn logout() -> Context {
        Context::Logout { resource: SESSION }
    }

    pub fn session() -> Context {
        Context::Session { resource: SESSION }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flattened_rejections_name_operation_and_resource() {
        let rejection = Rejection::new(
            Context::delete("events", Some("abc".to_owned())),
            BackendError::InvalidId("abc".to_owned()),
        );

        assert_eq!(
            serde_json::to_value(rejection.flatten()).unwrap(),
            json!({
                "operation": "delete",
                "resource": "events",
                "id": "abc",
                "error": "invalid id: abc"
            })
        );
    }

    #[test]
    fn warp_rejections_carry_the_context() {
        let rejection: reject::Rejection =
            Rejection::new(Context::upload(), BackendError::PartsMissing).into();

        let found = rejection.find::<Rejection>().unwrap();
        assert_eq!(
            serde_json::to_value(found.flatten()).unwrap()["operation"],
            "upload"
        );
        assert!(matches!(found.error, BackendError::PartsMissing));
    }
}
