//! Create command implementation.

use crate::cli::{CreateArgs, Session, clean_list};
use crate::error::Result;
use crate::model::{Priority, Ticket, TicketType};
use tracing::debug;

/// Execute the create command.
///
/// # Errors
///
/// Returns a validation error for a bad type or priority, or the store's
/// error if the ticket cannot be written.
pub fn execute(args: &CreateArgs, session: &mut Session) -> Result<()> {
    let ticket_type: TicketType = args.ticket_type.parse()?;
    let priority: Priority = args.priority.parse()?;

    let mut ticket = Ticket::new(args.title.trim(), ticket_type);
    ticket.priority = priority;
    ticket.description = args.description.clone().filter(|d| !d.trim().is_empty());
    ticket.critical_path = args.critical_path;
    ticket.assigned_to = args.assigned_to.clone().filter(|a| !a.trim().is_empty());
    ticket.created_by = args.created_by.clone().filter(|c| !c.trim().is_empty());
    ticket.tags = clean_list(&args.tags).into_iter().collect();
    ticket.files = clean_list(&args.files);
    ticket.comments = clean_list(&args.comments);

    debug!(title = %ticket.title, project = %args.project, "Creating ticket");
    let created = session.store()?.create_ticket(&ticket, &args.project)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        let id = created.id.unwrap_or_default();
        println!("Created ticket #{id}: {}", created.title);
    }
    Ok(())
}
