//! Delete command implementation.

use crate::cli::{DeleteArgs, Session};
use crate::error::Result;
use crate::model::TicketKey;

/// Execute the delete command.
///
/// # Errors
///
/// Returns a validation error without a usable id or title, `NotFound` if
/// nothing matches, or a write error if the delete fails.
pub fn execute(args: &DeleteArgs, session: &mut Session) -> Result<()> {
    let target = &args.target;
    let key = TicketKey::from_parts(target.id, target.title.as_deref())?;
    let id = session.store()?.delete_ticket(&target.project, &key)?;
    println!("Deleted ticket #{id} from project '{}'", target.project);
    Ok(())
}
