#![allow(dead_code)]

use alexandria::model::{Priority, Status, Ticket, TicketType};

/// A plain task with the given title.
pub fn ticket(title: &str) -> Ticket {
    Ticket::new(title, TicketType::Task)
}

/// A fully populated bug report.
pub fn bug(title: &str, tags: &[&str]) -> Ticket {
    let mut ticket = Ticket::new(title, TicketType::Bug);
    ticket.description = Some(format!("Steps to reproduce {title}"));
    ticket.priority = Priority::High;
    ticket.status = Status::Open;
    ticket.created_by = Some("alice".to_string());
    ticket.assigned_to = Some("bob".to_string());
    ticket.tags = tags.iter().map(|tag| (*tag).to_string()).collect();
    ticket.files = vec!["src/main.rs".to_string(), "src/lib.rs".to_string()];
    ticket.comments = vec!["first seen in staging".to_string()];
    ticket
}
