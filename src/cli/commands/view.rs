//! View command implementation.

use crate::cli::{Session, ViewArgs};
use crate::error::Result;
use crate::format::{comment_history, ticket_detail};
use crate::model::TicketKey;

/// Execute the view command.
///
/// # Errors
///
/// Returns a validation error without a usable id or title, or `NotFound`
/// if no ticket matches in the project.
pub fn execute(args: &ViewArgs, session: &mut Session) -> Result<()> {
    let target = &args.target;
    let key = TicketKey::from_parts(target.id, target.title.as_deref())?;
    let store = session.store()?;
    let ticket = store.view_ticket(&target.project, &key)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
        return Ok(());
    }

    print!("{}", ticket_detail(&ticket));
    if args.history {
        let comments = store.comments(&target.project, &key)?;
        println!("\nHistory:");
        print!("{}", comment_history(&comments));
    }
    Ok(())
}
