//! Shared key-field search used by list queries.
//!
//! A search is an OR of case-insensitive substring matches over the filter's
//! key fields. [`ModelQuery`] renders it as SQL for table-backed providers;
//! [`matches_filter`] applies the same rule to in-memory records.

use serde_json::Value;

use crate::domain::{ContentData, ContentFilter};
use crate::error::{ContentError, Result};

/// Key fields of a filter, rejecting filters without any
pub fn key_fields(filter: &ContentFilter) -> Result<&[String]> {
    match filter.key_fields.as_deref() {
        Some(fields) if !fields.is_empty() => Ok(fields),
        _ => Err(ContentError::InvalidFilter(
            "key_fields is required".to_string(),
        )),
    }
}

/// Check that a name is a plain SQL identifier (letters, digits, underscore)
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// SQL search over one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelQuery {
    /// SQL text with positional `?` parameters
    pub sql: String,

    /// LIKE patterns, one per key field
    pub params: Vec<String>,
}

impl ModelQuery {
    /// Build the key-field search for `table`.
    ///
    /// Rows must have a non-null `id`; page and page size become
    /// `LIMIT`/`OFFSET`.
    pub fn search(
        table: &str,
        filter: &ContentFilter,
        page: usize,
        per_page: usize,
    ) -> Result<Self> {
        if !is_identifier(table) {
            return Err(ContentError::InvalidFilter(format!(
                "invalid table name: {}",
                table
            )));
        }

        let fields = key_fields(filter)?;
        let mut conditions = Vec::with_capacity(fields.len());
        let mut params = Vec::with_capacity(fields.len());

        for field in fields {
            if !is_identifier(field) {
                return Err(ContentError::InvalidFilter(format!(
                    "invalid key field: {:?}",
                    field
                )));
            }
            conditions.push(format!("UPPER(\"{}\") LIKE UPPER(?)", field));
            params.push(format!("%{}%", filter.value_for(field)));
        }

        let sql = format!(
            "SELECT * FROM \"{}\" WHERE id IS NOT NULL AND ({}) LIMIT {} OFFSET {}",
            table,
            conditions.join(" OR "),
            per_page,
            super::page_offset(page, per_page)
        );

        Ok(Self { sql, params })
    }
}

/// Apply the key-field search to an in-memory record
pub fn matches_filter(record: &ContentData, filter: &ContentFilter) -> Result<bool> {
    let fields = key_fields(filter)?;

    Ok(fields.iter().any(|field| {
        let needle = filter.value_for(field).to_lowercase();
        match record.get(field) {
            Some(Value::String(s)) => s.to_lowercase().contains(&needle),
            Some(Value::Number(n)) => n.to_string().contains(&needle),
            Some(Value::Bool(b)) => b.to_string().contains(&needle),
            _ => false,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_sql() {
        let filter = ContentFilter::new(["title", "slug"]).with_query("rust");
        let query = ModelQuery::search("posts", &filter, 2, 10).unwrap();

        assert_eq!(
            query.sql,
            "SELECT * FROM \"posts\" WHERE id IS NOT NULL AND \
             (UPPER(\"title\") LIKE UPPER(?) OR UPPER(\"slug\") LIKE UPPER(?)) \
             LIMIT 10 OFFSET 10"
        );
        assert_eq!(query.params, vec!["%rust%", "%rust%"]);
    }

    #[test]
    fn test_search_requires_key_fields() {
        let result = ModelQuery::search("posts", &ContentFilter::default(), 1, 20);
        assert!(matches!(result, Err(ContentError::InvalidFilter(_))));

        let empty = ContentFilter::new(Vec::<String>::new());
        assert!(ModelQuery::search("posts", &empty, 1, 20).is_err());
    }

    #[test]
    fn test_search_rejects_non_identifiers() {
        let filter = ContentFilter::new(["title; DROP TABLE posts"]);
        assert!(ModelQuery::search("posts", &filter, 1, 20).is_err());

        let filter = ContentFilter::new(["title"]);
        assert!(ModelQuery::search("posts--", &filter, 1, 20).is_err());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("title"));
        assert!(is_identifier("_created_at2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("a b"));
    }

    #[test]
    fn test_matches_filter_any_field() {
        let record = json!({"title": "Intro to Rust", "slug": "intro", "views": 120})
            .as_object()
            .cloned()
            .unwrap();

        let filter = ContentFilter::new(["title", "slug"]).with_query("RUST");
        assert!(matches_filter(&record, &filter).unwrap());

        let filter = ContentFilter::new(["slug"]).with_value("slug", "outro");
        assert!(!matches_filter(&record, &filter).unwrap());

        let filter = ContentFilter::new(["views"]).with_query("12");
        assert!(matches_filter(&record, &filter).unwrap());

        let filter = ContentFilter::new(["missing"]).with_query("x");
        assert!(!matches_filter(&record, &filter).unwrap());
    }
}
