//! List command implementation.

use crate::cli::{ListArgs, OutputFormat, Session, clean_list};
use crate::error::Result;
use crate::format::{ticket_summary, ticket_table};
use crate::model::{Priority, Status, TicketType};
use crate::storage::ListFilters;

/// Execute the list command.
///
/// # Errors
///
/// Returns a validation error for a bad filter value, or the store's error
/// if the query fails.
pub fn execute(args: &ListArgs, session: &mut Session) -> Result<()> {
    let filters = filters_from_args(args)?;
    let tickets = session.store()?.list_tickets(&filters)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tickets)?),
        OutputFormat::Table => print!("{}", ticket_table(&tickets)),
        OutputFormat::Summary => print!("{}", ticket_summary(&tickets)),
    }
    Ok(())
}

/// Validate the flag values and build the store filter.
fn filters_from_args(args: &ListArgs) -> Result<ListFilters> {
    let non_blank = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    Ok(ListFilters {
        status: non_blank(&args.status)
            .map(|s| s.parse::<Status>())
            .transpose()?,
        ticket_type: non_blank(&args.ticket_type)
            .map(|t| t.parse::<TicketType>())
            .transpose()?,
        priority: non_blank(&args.priority)
            .map(|p| p.parse::<Priority>())
            .transpose()?,
        assigned_to: non_blank(&args.assigned_to),
        project: non_blank(&args.project),
        tags: clean_list(&args.tags),
        limit: args.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn args() -> ListArgs {
        ListArgs {
            project: None,
            status: None,
            ticket_type: None,
            priority: None,
            assigned_to: None,
            tags: Vec::new(),
            limit: None,
            format: OutputFormat::Table,
        }
    }

    #[test]
    fn blank_flags_impose_no_constraint() {
        let mut raw = args();
        raw.project = Some("  ".into());
        raw.tags = vec![" ".into()];
        assert_eq!(filters_from_args(&raw).unwrap(), ListFilters::default());
    }

    #[test]
    fn bad_status_is_rejected_before_query() {
        let mut raw = args();
        raw.status = Some("blocked".into());
        let err = filters_from_args(&raw).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Validation);
    }

    #[test]
    fn values_are_parsed() {
        let mut raw = args();
        raw.status = Some("in-progress".into());
        raw.priority = Some("high".into());
        raw.tags = vec!["ui".into(), " db".into()];
        let filters = filters_from_args(&raw).unwrap();
        assert_eq!(filters.status, Some(Status::InProgress));
        assert_eq!(filters.priority, Some(Priority::High));
        assert_eq!(filters.tags, vec!["ui", "db"]);
    }
}
