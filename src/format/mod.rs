//! Text output for tickets: list table, summary counts, and detail view.
//!
//! JSON output goes through serde on [`Ticket`] directly; everything here
//! is for humans.

use crate::model::{Comment, Priority, Status, Ticket, TicketType};
use std::fmt::Write as _;

const TITLE_WIDTH: usize = 50;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// One row per ticket with aligned columns.
#[must_use]
pub fn ticket_table(tickets: &[Ticket]) -> String {
    if tickets.is_empty() {
        return "No tickets found.\n".to_string();
    }

    let header = ["ID", "PROJECT", "TYPE", "STATUS", "PRIORITY", "CP", "ASSIGNED", "TITLE"];
    let rows: Vec<[String; 8]> = tickets
        .iter()
        .map(|ticket| {
            [
                ticket.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                ticket.project.clone(),
                ticket.ticket_type.to_string(),
                ticket.status.to_string(),
                ticket.priority.to_string(),
                if ticket.critical_path { "*" } else { "" }.to_string(),
                ticket.assigned_to.clone().unwrap_or_default(),
                truncate(&ticket.title, TITLE_WIDTH),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header.map(str::to_string), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    let _ = writeln!(out, "\n{} ticket(s)", tickets.len());
    out
}

fn push_row(out: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    let last = cells.len() - 1;
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            out.push_str(cell);
        } else {
            let _ = write!(out, "{cell:<width$}  ");
        }
    }
    out.push('\n');
}

/// Counts by status, type and priority.
#[must_use]
pub fn ticket_summary(tickets: &[Ticket]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total: {}", tickets.len());

    let critical = tickets.iter().filter(|t| t.critical_path).count();
    let _ = writeln!(out, "Critical path: {critical}");

    let _ = writeln!(out, "\nBy status:");
    for status in Status::ALL {
        let count = tickets.iter().filter(|t| t.status == status).count();
        let _ = writeln!(out, "  {:<12} {count}", status.as_str());
    }

    let _ = writeln!(out, "\nBy type:");
    for ticket_type in TicketType::ALL {
        let count = tickets.iter().filter(|t| t.ticket_type == ticket_type).count();
        let _ = writeln!(out, "  {:<12} {count}", ticket_type.as_str());
    }

    let _ = writeln!(out, "\nBy priority:");
    for priority in Priority::ALL {
        let count = tickets.iter().filter(|t| t.priority == priority).count();
        let _ = writeln!(out, "  {:<12} {count}", priority.as_str());
    }
    out
}

/// Full multi-line view of a ticket.
#[must_use]
pub fn ticket_detail(ticket: &Ticket) -> String {
    let mut out = String::new();
    let id = ticket.id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let _ = writeln!(out, "#{id} {}", ticket.title);
    let _ = writeln!(out, "Project:       {}", ticket.project);
    let _ = writeln!(out, "Type:          {}", ticket.ticket_type);
    let _ = writeln!(out, "Status:        {}", ticket.status);
    let _ = writeln!(out, "Priority:      {}", ticket.priority);
    let _ = writeln!(
        out,
        "Critical path: {}",
        if ticket.critical_path { "yes" } else { "no" }
    );
    if let Some(ref created_by) = ticket.created_by {
        let _ = writeln!(out, "Created by:    {created_by}");
    }
    if let Some(ref assigned_to) = ticket.assigned_to {
        let _ = writeln!(out, "Assigned to:   {assigned_to}");
    }
    let _ = writeln!(out, "Created:       {}", ticket.created_at.format(TIMESTAMP_FORMAT));
    let _ = writeln!(out, "Updated:       {}", ticket.updated_at.format(TIMESTAMP_FORMAT));

    if !ticket.tags.is_empty() {
        let tags: Vec<&str> = ticket.tags.iter().map(String::as_str).collect();
        let _ = writeln!(out, "Tags:          {}", tags.join(", "));
    }

    if let Some(ref description) = ticket.description {
        let _ = writeln!(out, "\n{}", description.trim_end());
    }

    if !ticket.files.is_empty() {
        let _ = writeln!(out, "\nFiles:");
        for file in &ticket.files {
            let _ = writeln!(out, "  {file}");
        }
    }

    if !ticket.comments.is_empty() {
        let _ = writeln!(out, "\nComments:");
        for comment in &ticket.comments {
            let _ = writeln!(out, "  - {comment}");
        }
    }
    out
}

/// Comments with their timestamps, oldest first.
#[must_use]
pub fn comment_history(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "No comments.\n".to_string();
    }
    let mut out = String::new();
    for comment in comments {
        let _ = writeln!(
            out,
            "[{}] {}",
            comment.created_at.format(TIMESTAMP_FORMAT),
            comment.text
        );
    }
    out
}
