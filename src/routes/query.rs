use serde::Deserialize;

/// Selects the record a `DELETE` applies to.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}
