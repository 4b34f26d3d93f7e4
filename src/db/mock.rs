use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{SecondsFormat, Utc};
use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::written_columns;
use crate::errors::BackendError;
use crate::resources::{Direction, Table};

/// Keeps rows in memory and imitates the column defaults of the
/// migrations.
#[derive(Default)]
pub(crate) struct MockDb {
    pub(crate) tables: RwLock<HashMap<Table, Vec<Map<String, Value>>>>,
}

impl MockDb {
    pub fn new() -> Self {
        Default::default()
    }

    /// Inserts a row as if a previous request had created it.
    pub fn seed(&self, table: Table, row: Value) -> Value {
        let row = match row {
            Value::Object(map) => map,
            _ => panic!("seeded rows must be objects"),
        };

        let stored = with_defaults(table, row);
        self.tables
            .write()
            .unwrap()
            .entry(table)
            .or_default()
            .push(stored.clone());

        Value::Object(stored)
    }

    pub fn rows(&self, table: Table) -> Vec<Map<String, Value>> {
        self.tables
            .read()
            .unwrap()
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false))
}

fn with_defaults(table: Table, mut row: Map<String, Value>) -> Map<String, Value> {
    row.entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));

    match table {
        Table::SiteContent => {
            row.entry("updated_at").or_insert_with(now);
        }
        _ => {
            row.entry("created_at").or_insert_with(now);
        }
    }

    if table.columns().contains(&"display_order") {
        row.entry("display_order").or_insert(Value::from(0));
    }

    if table.columns().contains(&"is_active") {
        row.entry("is_active").or_insert(Value::Bool(true));
    }

    for column in table.columns() {
        row.entry(*column).or_insert(Value::Null);
    }

    row
}

fn id_of(row: &Map<String, Value>) -> Option<Uuid> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|id| Uuid::parse_str(id).ok())
}

fn sort_key(row: &Map<String, Value>, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => format!("{:020}", n.as_i64().unwrap_or_default()),
        _ => String::new(),
    }
}

impl super::Db for MockDb {
    fn list(&self, table: Table) -> BoxFuture<Result<Vec<Value>, BackendError>> {
        async move {
            let (column, direction) = table.ordering();
            let mut rows = self.rows(table);

            rows.sort_by(|a, b| {
                let ordering = sort_key(a, column).cmp(&sort_key(b, column));
                let ordering = match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                };

                ordering.then_with(|| sort_key(a, "id").cmp(&sort_key(b, "id")))
            });

            Ok(rows.into_iter().map(Value::Object).collect())
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

            if table == Table::SiteContent {
                let key = values.get("key");
                if self.rows(table).iter().any(|row| row.get("key") == key) {
                    return Err(BackendError::DuplicateKey);
                }
            }

            let row = columns
                .into_iter()
                .filter_map(|column| values.get(column).map(|v| (column.to_owned(), v.clone())))
                .collect();

            Ok(self.seed(table, Value::Object(row)))
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

            let mut tables = self.tables.write().unwrap();
            let rows = tables.entry(table).or_default();

            let row = match rows.iter_mut().find(|row| id_of(row) == Some(id)) {
                Some(row) => row,
                None => return Ok(None),
            };

            for column in columns {
                if let Some(value) = values.get(column) {
                    row.insert(column.to_owned(), value.clone());
                }
            }

            Ok(Some(Value::Object(row.clone())))
        }
        .boxed()
    }

    fn delete(&self, table: Table, id: &Uuid) -> BoxFuture<Result<(), BackendError>> {
        let id = *id;

        async move {
            let mut tables = self.tables.write().unwrap();
            let rows = tables.entry(table).or_default();
            let before = rows.len();

            rows.retain(|row| id_of(row) != Some(id));

            if rows.len() == before {
                Err(BackendError::NonExistentId(id))
            } else {
                Ok(())
            }
        }
        .boxed()
    }
}
