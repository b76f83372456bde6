//! Core data types: tickets, their enumerations, and lookup keys.

use crate::error::{Result, TicketError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Kind of work a ticket tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Bug,
    Feature,
    #[default]
    Task,
}

impl TicketType {
    pub const ALL: [Self; 3] = [Self::Bug, Self::Feature, Self::Task];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bug" => Ok(Self::Bug),
            "feature" => Ok(Self::Feature),
            "task" => Ok(Self::Task),
            other => Err(TicketError::validation(
                "type",
                format!("'{other}' (must be: bug, feature, or task)"),
            )),
        }
    }
}

/// Workflow state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl Status {
    pub const ALL: [Self; 3] = [Self::Open, Self::InProgress, Self::Closed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(Self::Open),
            "in-progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            other => Err(TicketError::validation(
                "status",
                format!("'{other}' (must be: open, in-progress, or closed)"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Undefined,
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Undefined, Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "undefined" => Ok(Self::Undefined),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(TicketError::validation(
                "priority",
                format!("'{other}' (must be: undefined, low, medium, or high)"),
            )),
        }
    }
}

/// A ticket and its tag, file and comment collections.
///
/// `id` is `None` until the store assigns one on create. Timestamps are
/// stamped by the store; values supplied by callers are ignored on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub project: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub critical_path: bool,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Start a ticket with the required fields; everything else defaults.
    #[must_use]
    pub fn new(title: impl Into<String>, ticket_type: TicketType) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            project: String::new(),
            ticket_type,
            title: title.into(),
            description: None,
            critical_path: false,
            status: Status::default(),
            priority: Priority::default(),
            created_by: None,
            assigned_to: None,
            tags: BTreeSet::new(),
            files: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the invariants that enum types cannot express.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title or project.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(TicketError::validation("title", "must not be empty"));
        }
        if self.project.trim().is_empty() {
            return Err(TicketError::validation("project", "must not be empty"));
        }
        Ok(())
    }
}

/// A timestamped comment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub ticket_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// How a caller identifies an existing ticket within a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketKey {
    Id(i64),
    Title(String),
}

impl TicketKey {
    /// Build a key from optional caller inputs. An id takes precedence and
    /// the title is then ignored.
    ///
    /// # Errors
    ///
    /// Returns a validation error when neither is usable.
    pub fn from_parts(id: Option<i64>, title: Option<&str>) -> Result<Self> {
        match (id, title) {
            (Some(id), _) if id <= 0 => Err(TicketError::validation(
                "id",
                format!("{id} (must be a positive integer)"),
            )),
            (Some(id), _) => Ok(Self::Id(id)),
            (None, Some(title)) if !title.trim().is_empty() => Ok(Self::Title(title.to_string())),
            _ => Err(TicketError::validation(
                "identifier",
                "either an id or a title must be provided",
            )),
        }
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Title(title) => write!(f, "title '{title}'"),
        }
    }
}
