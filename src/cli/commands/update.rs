//! Update command implementation.

use crate::cli::{Session, UpdateArgs, clean_list};
use crate::error::{Result, TicketError};
use crate::format::ticket_detail;
use crate::model::{Ticket, TicketKey};
use tracing::debug;

/// Execute the update command.
///
/// The current ticket is read first and only the given flags are applied
/// on top of it. Comments on the result are the new ones only, so the
/// store appends them without repeating the existing history.
///
/// # Errors
///
/// Returns a validation error without a usable identifier, with a bad
/// enum value, or when no field would change. Returns `NotFound` if the
/// ticket does not exist in the project.
pub fn execute(args: &UpdateArgs, session: &mut Session) -> Result<()> {
    let key = TicketKey::from_parts(args.id, args.title.as_deref())?;
    let store = session.store()?;

    let current = store.view_ticket(&args.project, &key)?;
    let id = current
        .id
        .ok_or_else(|| TicketError::not_found(&args.project, key.to_string()))?;
    let change = apply_changes(current, args)?;

    let updated = store.update_ticket(&change, &args.project, &TicketKey::Id(id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!("Updated ticket #{id}");
        print!("{}", ticket_detail(&updated));
    }
    Ok(())
}

/// Merge the given flags onto `ticket`.
fn apply_changes(mut ticket: Ticket, args: &UpdateArgs) -> Result<Ticket> {
    let mut changed = false;

    if let Some(ref title) = args.new_title {
        ticket.title = title.trim().to_string();
        changed = true;
    }
    if let Some(ref description) = args.description {
        ticket.description = Some(description.clone()).filter(|d| !d.trim().is_empty());
        changed = true;
    }
    if let Some(ref ticket_type) = args.ticket_type {
        ticket.ticket_type = ticket_type.parse()?;
        changed = true;
    }
    if let Some(ref status) = args.status {
        ticket.status = status.parse()?;
        changed = true;
    }
    if let Some(ref priority) = args.priority {
        ticket.priority = priority.parse()?;
        changed = true;
    }
    if let Some(critical_path) = args.critical_path {
        ticket.critical_path = critical_path;
        changed = true;
    }
    if let Some(ref assigned_to) = args.assigned_to {
        ticket.assigned_to = Some(assigned_to.trim().to_string()).filter(|a| !a.is_empty());
        changed = true;
    }
    if let Some(ref tags) = args.tags {
        ticket.tags = clean_list(tags).into_iter().collect();
        changed = true;
    }
    if let Some(ref files) = args.files {
        ticket.files = clean_list(files);
        changed = true;
    }

    ticket.comments = args.comments.as_deref().map(clean_list).unwrap_or_default();
    if !ticket.comments.is_empty() {
        changed = true;
    }

    if !changed {
        return Err(TicketError::validation(
            "update",
            "no fields to update (give at least one field flag)",
        ));
    }

    debug!(id = ?ticket.id, comments = ticket.comments.len(), "Applied update flags");
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::{Status, TicketType};

    fn args() -> UpdateArgs {
        UpdateArgs {
            id: Some(1),
            title: None,
            project: "P".into(),
            new_title: None,
            description: None,
            ticket_type: None,
            status: None,
            priority: None,
            critical_path: None,
            assigned_to: None,
            tags: None,
            files: None,
            comments: None,
            json: false,
        }
    }

    fn existing() -> Ticket {
        let mut ticket = Ticket::new("A", TicketType::Task);
        ticket.id = Some(1);
        ticket.project = "P".into();
        ticket.tags = ["old".to_string()].into();
        ticket.comments = vec!["earlier".into()];
        ticket
    }

    #[test]
    fn no_flags_is_a_validation_error() {
        let err = apply_changes(existing(), &args()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Validation);
    }

    #[test]
    fn existing_comments_are_not_resent() {
        let mut raw = args();
        raw.status = Some("in-progress".into());
        let change = apply_changes(existing(), &raw).unwrap();
        assert_eq!(change.status, Status::InProgress);
        assert!(change.comments.is_empty());
        assert_eq!(change.tags.len(), 1);
    }

    #[test]
    fn new_comments_alone_count_as_a_change() {
        let mut raw = args();
        raw.comments = Some(vec!["later".into()]);
        let change = apply_changes(existing(), &raw).unwrap();
        assert_eq!(change.comments, vec!["later"]);
    }

    #[test]
    fn bad_priority_is_rejected() {
        let mut raw = args();
        raw.priority = Some("urgent".into());
        assert!(apply_changes(existing(), &raw).is_err());
    }
}
