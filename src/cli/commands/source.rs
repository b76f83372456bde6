//! Source command: show or switch the database backend.

use crate::cli::{Session, SourceArgs};
use crate::config::{self, BackendConfig, BackendKind, RemoteCredentials};
use crate::error::Result;
use tracing::info;

/// Execute the source command.
///
/// # Errors
///
/// Returns a validation error for an unknown backend name, `ConfigMissing`
/// when switching to `remote` without credentials, or the new backend's
/// connection error.
pub fn execute(args: &SourceArgs, session: &mut Session) -> Result<()> {
    let credentials = RemoteCredentials::from_env();

    let Some(ref backend) = args.backend else {
        return show_status(session, &credentials);
    };

    let kind: BackendKind = backend.parse()?;
    session.switch(kind, &credentials)?;
    info!(backend = %kind, "Backend switched");
    println!("Switched to {kind} database");
    if args.status {
        show_status(session, &credentials)?;
    }
    Ok(())
}

fn show_status(session: &Session, credentials: &RemoteCredentials) -> Result<()> {
    let config = BackendConfig::load(&session.data_dir)?;
    println!("Current database: {}", config.database_type);

    match config.database_type {
        BackendKind::LocalFile => {
            let path = config::resolve_db_path(&session.data_dir, session.db_override.as_deref());
            println!("Path: {}", path.display());
        }
        BackendKind::Remote => {
            println!(
                "URL: {}",
                credentials.url.as_deref().unwrap_or("(TURSO_URL not set)")
            );
            println!(
                "Token: {}",
                credentials
                    .token_preview()
                    .as_deref()
                    .unwrap_or("(TURSO_AUTH_TOKEN not set)")
            );
        }
    }
    Ok(())
}
