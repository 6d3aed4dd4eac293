//! SQLite table provider.
//!
//! Serves rows of one table as content items. Rows are looked up by `uuid`,
//! `id` or `slug` (whichever columns exist, in that order) and listed with
//! the shared key-field search.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use serde_json::{Number, Value};

use super::query::{is_identifier, ModelQuery};
use super::{page_offset, ContentProvider, ProviderInfo};
use crate::domain::{resolve_content_id, ContentData, ContentFilter, ContentItem};
use crate::error::{ContentError, Result};

/// Columns tried, in order, when looking up a row by key
const KEY_COLUMNS: [&str; 3] = ["uuid", "id", "slug"];

/// Content provider backed by a SQLite table
pub struct SqliteProvider {
    handler: String,
    info: ProviderInfo,
    table: String,
    conn: Mutex<Connection>,
}

impl SqliteProvider {
    /// Open a database file and serve `table` from it
    pub fn open(
        handler: impl Into<String>,
        path: &Path,
        table: impl Into<String>,
        info: ProviderInfo,
    ) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(handler, conn, table, info)
    }

    /// Serve `table` from an existing connection
    pub fn from_connection(
        handler: impl Into<String>,
        conn: Connection,
        table: impl Into<String>,
        info: ProviderInfo,
    ) -> Result<Self> {
        let table = table.into();
        if !is_identifier(&table) {
            return Err(ContentError::InvalidFilter(format!(
                "invalid table name: {}",
                table
            )));
        }

        Ok(Self {
            handler: handler.into(),
            info,
            table,
            conn: Mutex::new(conn),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// First key column holding `key`, with the matching row
    fn find_row(&self, key: &str) -> Result<Option<(String, ContentData)>> {
        let conn = self.conn();
        let columns = Self::columns(&conn, &self.table)?;

        for column in KEY_COLUMNS {
            if !columns.iter().any(|c| c == column) {
                continue;
            }

            let sql = format!(
                "SELECT * FROM \"{}\" WHERE \"{}\" = ?1 LIMIT 1",
                self.table, column
            );
            let row = conn.query_row(&sql, [key], row_to_data).optional()?;
            if let Some(row) = row {
                return Ok(Some((column.to_string(), row)));
            }
        }

        Ok(None)
    }

    fn fetch_rows(&self, sql: &str, params: &[String]) -> Result<Vec<ContentData>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), row_to_data)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn list_rows(
        &self,
        filter: Option<&ContentFilter>,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<ContentData>> {
        match filter {
            Some(filter) => {
                let query = ModelQuery::search(&self.table, filter, page, per_page)?;
                self.fetch_rows(&query.sql, &query.params)
            }
            None => {
                let sql = format!(
                    "SELECT * FROM \"{}\" WHERE id IS NOT NULL LIMIT {} OFFSET {}",
                    self.table,
                    per_page,
                    page_offset(page, per_page)
                );
                self.fetch_rows(&sql, &[])
            }
        }
    }

    /// Known columns of `data`, in payload order
    fn writable_columns(&self, conn: &Connection, data: &ContentData) -> Result<Vec<String>> {
        let columns = Self::columns(conn, &self.table)?;
        Ok(data
            .keys()
            .filter(|k| is_identifier(k) && columns.contains(*k))
            .cloned()
            .collect())
    }

    fn insert_row(&self, data: &ContentData) -> Result<Option<ContentData>> {
        let conn = self.conn();
        let columns = self.writable_columns(&conn, data)?;
        if columns.is_empty() {
            return Ok(None);
        }

        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.table,
            quoted(&columns),
            vec!["?"; columns.len()].join(", ")
        );
        let values: Vec<SqlValue> = columns.iter().map(|c| json_to_sql(&data[c])).collect();
        conn.execute(&sql, params_from_iter(values))?;

        let rowid = conn.last_insert_rowid();
        let sql = format!("SELECT * FROM \"{}\" WHERE rowid = ?1", self.table);
        Ok(conn.query_row(&sql, [rowid], row_to_data).optional()?)
    }

    fn update_row(&self, key: &str, data: &ContentData) -> Result<bool> {
        let Some((key_column, _)) = self.find_row(key)? else {
            return Ok(false);
        };

        let conn = self.conn();
        let columns = self.writable_columns(&conn, data)?;
        if columns.is_empty() {
            return Ok(false);
        }

        let assignments: Vec<String> = columns.iter().map(|c| format!("\"{}\" = ?", c)).collect();
        let sql = format!(
            "UPDATE \"{}\" SET {} WHERE \"{}\" = ?",
            self.table,
            assignments.join(", "),
            key_column
        );
        let mut values: Vec<SqlValue> = columns.iter().map(|c| json_to_sql(&data[c])).collect();
        values.push(SqlValue::Text(key.to_string()));

        let changed = conn.execute(&sql, params_from_iter(values))?;
        Ok(changed > 0)
    }

    fn count_rows(&self) -> Result<u64> {
        let conn = self.conn();
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", self.table);
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl ContentProvider for SqliteProvider {
    fn handler(&self) -> &str {
        &self.handler
    }

    fn info(&self) -> &ProviderInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ProviderInfo {
        &mut self.info
    }

    async fn get_content(&self, key: &str) -> Result<Option<ContentData>> {
        Ok(self.find_row(key)?.map(|(_, row)| row))
    }

    async fn get_content_list(
        &self,
        filter: Option<&ContentFilter>,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<ContentItem>> {
        let title = self.item_title();
        let rows = self.list_rows(filter, page, per_page)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = resolve_content_id(&row).unwrap_or_default();
                ContentItem::new(row, title.clone(), id)
            })
            .collect())
    }

    async fn create_item(
        &self,
        data: ContentData,
        _content_type: Option<&str>,
    ) -> Result<Option<ContentData>> {
        self.insert_row(&data)
    }

    async fn save_item(
        &self,
        key: &str,
        data: ContentData,
        _content_type: Option<&str>,
    ) -> Result<bool> {
        self.update_row(key, &data)
    }

    async fn items_count(&self) -> Result<Option<u64>> {
        Ok(Some(self.count_rows()?))
    }
}

fn quoted(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn row_to_data(row: &Row<'_>) -> rusqlite::Result<ContentData> {
    let mut data = ContentData::new();
    for (index, name) in row.as_ref().column_names().iter().enumerate() {
        let value = match row.get_ref(index)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Number(i.into()),
            ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
        };
        data.insert(name.to_string(), value);
    }
    Ok(data)
}

fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> SqliteProvider {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE posts (id INTEGER PRIMARY KEY, uuid TEXT, slug TEXT, title TEXT);
             INSERT INTO posts (uuid, slug, title) VALUES ('u-1', 'intro', 'Intro to Rust');
             INSERT INTO posts (uuid, slug, title) VALUES ('u-2', 'async', 'Async Rust');
             INSERT INTO posts (uuid, slug, title) VALUES ('u-3', 'python', 'Python tips');",
        )
        .unwrap();

        SqliteProvider::from_connection(
            "blog.posts",
            conn,
            "posts",
            ProviderInfo::new("blog", "Blog").with_content_types(["post"]),
        )
        .unwrap()
    }

    fn data(value: Value) -> ContentData {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_get_by_uuid_id_and_slug() {
        let provider = provider();

        let item = provider.get("u-2").await.unwrap().unwrap();
        assert_eq!(item.id(), "u-2");
        assert_eq!(item.value("slug"), Some(&json!("async")));

        let item = provider.get("1").await.unwrap().unwrap();
        assert_eq!(item.id(), "u-1");

        let item = provider.get("python").await.unwrap().unwrap();
        assert_eq!(item.id(), "u-3");

        assert!(provider.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_with_filter_is_case_insensitive() {
        let provider = provider();
        let filter = ContentFilter::new(["title"]).with_query("RUST");

        let items = provider.get_content_list(Some(&filter), 1, 20).await.unwrap();
        let ids: Vec<&str> = items.iter().map(ContentItem::id).collect();
        assert_eq!(ids, vec!["u-1", "u-2"]);
    }

    #[tokio::test]
    async fn test_list_without_key_fields_is_invalid() {
        let provider = provider();
        let result = provider
            .get_content_list(Some(&ContentFilter::default()), 1, 20)
            .await;
        assert!(matches!(result, Err(ContentError::InvalidFilter(_))));
    }

    #[tokio::test]
    async fn test_list_pages() {
        let provider = provider();

        let first = provider.get_content_list(None, 1, 2).await.unwrap();
        let second = provider.get_content_list(None, 2, 2).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id(), "u-3");
    }

    #[tokio::test]
    async fn test_create_save_and_count() {
        let provider = provider();

        let created = provider
            .create_item(data(json!({"uuid": "u-4", "title": "New", "ignored": 1})), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created["uuid"], json!("u-4"));
        assert_eq!(created["id"], json!(4));
        assert_eq!(provider.items_count().await.unwrap(), Some(4));

        let saved = provider
            .save_item("u-4", data(json!({"title": "Renamed"})), None)
            .await
            .unwrap();
        assert!(saved);

        let item = provider.get("u-4").await.unwrap().unwrap();
        assert_eq!(item.value("title"), Some(&json!("Renamed")));

        let saved = provider
            .save_item("nope", data(json!({"title": "x"})), None)
            .await
            .unwrap();
        assert!(!saved);
    }

    #[test]
    fn test_rejects_bad_table_name() {
        let conn = Connection::open_in_memory().unwrap();
        let result = SqliteProvider::from_connection("h", conn, "posts; --", ProviderInfo::default());
        assert!(result.is_err());
    }
}
