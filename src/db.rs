use futures::future::BoxFuture;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::BackendError;
use crate::resources::Table;

#[cfg(test)]
pub(crate) mod mock;

/// Row storage for the content tables. Rows travel as JSON objects keyed
/// by column name; callers decode them with [`crate::resources::from_row`].
pub trait Db {
    /// Returns every row of `table` in its display order.
    fn list(&self, table: Table) -> BoxFuture<Result<Vec<Value>, BackendError>>;

    /// Inserts a row built from `values` and returns it as stored.
    fn insert(
        &self,
        table: Table,
        values: Map<String, Value>,
    ) -> BoxFuture<Result<Value, BackendError>>;

    /// Overwrites the columns present in `values`. Returns `None` when no
    /// row has the given id.
    fn update(
        &self,
        table: Table,
        id: &Uuid,
        values: Map<String, Value>,
    ) -> BoxFuture<Result<Option<Value>, BackendError>>;

    fn delete(&self, table: Table, id: &Uuid) -> BoxFuture<Result<(), BackendError>>;
}

/// Picks the writable columns of `table` that appear in `values`, in
/// table order.
fn written_columns(table: Table, values: &Map<String, Value>) -> Vec<&'static str> {
    table
        .columns()
        .iter()
        .copied()
        .filter(|column| values.contains_key(*column))
        .collect()
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use serde_json::{Map, Value};
    use sqlx::{postgres::PgPool, types::Json};
    use uuid::Uuid;

    use super::written_columns;
    use crate::errors::BackendError;
    use crate::resources::Table;

    const SITE_CONTENT_KEY_CONSTRAINT: &str = "site_content_key";

    // invalid_text_representation, invalid_datetime_format,
    // datetime_field_overflow, not_null_violation
    const REJECTED_VALUE_CODES: &[&str] = &["22P02", "22007", "22008", "23502"];

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn list(&self, table: Table) -> BoxFuture<Result<Vec<Value>, BackendError>> {
            async move {
                let (column, direction) = table.ordering();
                let sql = format!(
                    "SELECT to_jsonb(t) AS row FROM {table} t ORDER BY t.{column} {direction}, t.id",
                    table = table.name(),
                    column = column,
                    direction = direction.as_sql(),
                );

                let rows: Vec<(Json<Value>,)> = sqlx::query_as(&sql)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(rows.into_iter().map(|(Json(row),)| row).collect())
            }
            .boxed()
        }

        fn insert(
            &self,
            table: Table,
            values: Map<String, Value>,
        ) -> BoxFuture<Result<Value, BackendError>> {
            async move {
                let columns = written_columns(table, &values);

                if columns.is_empty() {
                    return Err(BackendError::NothingToWrite);
                }

                let columns = columns.join(", ");
                let sql = format!(
                    "INSERT INTO {table} ({columns}) \
                     SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) \
                     RETURNING to_jsonb({table}.*) AS row",
                    table = table.name(),
                    columns = columns,
                );

                let (Json(row),): (Json<Value>,) = sqlx::query_as(&sql)
                    .bind(Json(Value::Object(values)))
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(row)
            }
            .boxed()
        }

        fn update(
            &self,
            table: Table,
            id: &Uuid,
            values: Map<String, Value>,
        ) -> BoxFuture<Result<Option<Value>, BackendError>> {
            let id = *id;

            async move {
                let columns = written_columns(table, &values);

                if columns.is_empty() {
                    return Err(BackendError::NothingToWrite);
                }

                let assignments = columns
                    .iter()
                    .map(|column| format!("{0} = source.{0}", column))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "UPDATE {table} AS target SET {assignments} \
                     FROM jsonb_populate_record(NULL::{table}, $2) AS source \
                     WHERE target.id = $1 \
                     RETURNING to_jsonb(target) AS row",
                    table = table.name(),
                    assignments = assignments,
                );

                let row: Option<(Json<Value>,)> = sqlx::query_as(&sql)
                    .bind(id)
                    .bind(Json(Value::Object(values)))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(row.map(|(Json(row),)| row))
            }
            .boxed()
        }

        fn delete(&self, table: Table, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
            let id = *id;

            async move {
                let sql = format!("DELETE FROM {} WHERE id = $1", table.name());

                let count = sqlx::query(&sql)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if count == 0 {
                    Err(BackendError::NonExistentId(id))
                } else {
                    Ok(())
                }
            }
            .boxed()
        }
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        use sqlx::Error;

        match error {
            Error::Database(ref e) if e.constraint() == Some(SITE_CONTENT_KEY_CONSTRAINT) => {
                BackendError::DuplicateKey
            }
            Error::Database(ref e)
                if e.code().map_or(false, |code| {
                    REJECTED_VALUE_CODES.iter().any(|rejected| &*code == *rejected)
                }) =>
            {
                BackendError::InvalidValue(e.message().to_owned())
            }
            _ => BackendError::Sqlx { source: error },
        }
    }
}
