//! Dynamic SQL for ticket listing.

use crate::model::{Priority, Status, TicketType};
use crate::storage::backend::SqlValue;
use std::fmt::Write as _;

/// Columns of the main ticket row, in the order `ticket_from_row` reads them.
pub const TICKET_COLUMNS: &str = "t.id, t.project, t.type, t.title, t.description, \
     t.critical_path, t.status, t.priority, t.created_by, t.assigned_to, \
     t.created_at, t.updated_at";

/// Sparse listing filter. Every field is optional and fields combine with
/// AND; `tags` matches tickets carrying at least one of the given tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub status: Option<Status>,
    pub ticket_type: Option<TicketType>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<String>,
    pub project: Option<String>,
    pub tags: Vec<String>,
    pub limit: Option<u32>,
}

impl ListFilters {
    #[must_use]
    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A parameterized listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Assemble the listing query for `filters`.
///
/// Only syntax is built here; every filter value travels as a bound
/// parameter. The tag join can yield one row per matching tag, so the
/// select is `DISTINCT`. Rows come back newest first, ties broken by id.
#[must_use]
pub fn build_list_query(filters: &ListFilters) -> ListQuery {
    let mut sql = format!("SELECT DISTINCT {TICKET_COLUMNS} FROM tickets t");
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<SqlValue> = Vec::new();

    if !filters.tags.is_empty() {
        sql.push_str(" JOIN ticket_tags tt ON tt.ticket_id = t.id");
        let placeholders = vec!["?"; filters.tags.len()].join(", ");
        clauses.push(format!("tt.tag IN ({placeholders})"));
        params.extend(filters.tags.iter().map(SqlValue::from));
    }

    if let Some(status) = filters.status {
        clauses.push("t.status = ?".to_string());
        params.push(status.as_str().into());
    }

    if let Some(ticket_type) = filters.ticket_type {
        clauses.push("t.type = ?".to_string());
        params.push(ticket_type.as_str().into());
    }

    if let Some(priority) = filters.priority {
        clauses.push("t.priority = ?".to_string());
        params.push(priority.as_str().into());
    }

    if let Some(ref assigned_to) = filters.assigned_to {
        clauses.push("t.assigned_to = ?".to_string());
        params.push(assigned_to.into());
    }

    if let Some(ref project) = filters.project {
        clauses.push("t.project = ?".to_string());
        params.push(project.into());
    }

    if !clauses.is_empty() {
        let _ = write!(sql, " WHERE {}", clauses.join(" AND "));
    }

    sql.push_str(" ORDER BY t.created_at DESC, t.id DESC");

    if let Some(limit) = filters.limit {
        sql.push_str(" LIMIT ?");
        params.push(i64::from(limit).into());
    }

    ListQuery { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_selects_everything_newest_first() {
        let query = build_list_query(&ListFilters::default());
        assert!(!query.sql.contains("WHERE"));
        assert!(!query.sql.contains("JOIN"));
        assert!(query.sql.ends_with("ORDER BY t.created_at DESC, t.id DESC"));
        assert!(query.params.is_empty());
    }

    #[test]
    fn scalar_filters_are_conjunctive_and_bound() {
        let filters = ListFilters {
            status: Some(Status::InProgress),
            priority: Some(Priority::High),
            assigned_to: Some("o'brien".to_string()),
            project: Some("P".to_string()),
            ..ListFilters::default()
        };
        let query = build_list_query(&filters);

        assert!(query.sql.contains(
            "WHERE t.status = ? AND t.priority = ? AND t.assigned_to = ? AND t.project = ?"
        ));
        assert!(!query.sql.contains("o'brien"));
        assert_eq!(
            query.params,
            vec![
                SqlValue::from("in-progress"),
                SqlValue::from("high"),
                SqlValue::from("o'brien"),
                SqlValue::from("P"),
            ]
        );
    }

    #[test]
    fn tags_join_once_with_one_placeholder_per_tag() {
        let filters = ListFilters::for_project("P").with_tags(["ui", "db"]);
        let query = build_list_query(&filters);

        assert!(query.sql.starts_with("SELECT DISTINCT"));
        assert_eq!(query.sql.matches("JOIN ticket_tags").count(), 1);
        assert!(query.sql.contains("tt.tag IN (?, ?)"));
        assert_eq!(query.params[0], SqlValue::from("ui"));
        assert_eq!(query.params[1], SqlValue::from("db"));
        assert_eq!(query.params[2], SqlValue::from("P"));
    }

    #[test]
    fn limit_is_a_trailing_parameter() {
        let filters = ListFilters {
            ticket_type: Some(TicketType::Bug),
            limit: Some(5),
            ..ListFilters::default()
        };
        let query = build_list_query(&filters);
        assert!(query.sql.ends_with("LIMIT ?"));
        assert_eq!(query.params.last(), Some(&SqlValue::Integer(5)));
    }

    #[test]
    fn placeholder_count_matches_params() {
        let filters = ListFilters {
            status: Some(Status::Open),
            ticket_type: Some(TicketType::Task),
            priority: Some(Priority::Low),
            assigned_to: Some("me".into()),
            project: Some("P".into()),
            tags: vec!["a".into(), "b".into(), "c".into()],
            limit: Some(1),
        };
        let query = build_list_query(&filters);
        assert_eq!(query.sql.matches('?').count(), query.params.len());
    }
}
