//! Configuration for `alexandria`.
//!
//! Sources:
//! 1. `--db` CLI override for the local database path
//! 2. Environment: `ALEXANDRIA_DIR`, `TURSO_URL`, `TURSO_AUTH_TOKEN`
//! 3. Backend selection file (`<data_dir>/.config/config.json`)
//! 4. Defaults (`$HOME/Alexandria`, `local-file`, `tickets.db`)

use crate::error::{Result, TicketError};
use crate::storage::backend::{BackendRegistry, ConnectParams, LOCAL_FILE, REMOTE};
use crate::storage::TicketStore;
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

pub const DATA_DIR_ENV: &str = "ALEXANDRIA_DIR";
pub const TURSO_URL_ENV: &str = "TURSO_URL";
pub const TURSO_AUTH_TOKEN_ENV: &str = "TURSO_AUTH_TOKEN";

const DATA_DIR_NAME: &str = "Alexandria";
const CONFIG_DIR_NAME: &str = ".config";
const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_DB_FILENAME: &str = "tickets.db";
const TOKEN_PREVIEW_LEN: usize = 8;

/// Which storage backend the process connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendKind {
    #[default]
    #[serde(rename = "local-file", alias = "sqlite")]
    LocalFile,
    #[serde(rename = "remote", alias = "turso")]
    Remote,
}

impl BackendKind {
    /// Kind name as registered in the [`BackendRegistry`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalFile => LOCAL_FILE,
            Self::Remote => REMOTE,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "local-file" | "sqlite" => Ok(Self::LocalFile),
            "remote" | "turso" => Ok(Self::Remote),
            other => Err(TicketError::validation(
                "backend",
                format!("'{other}' (must be: local-file or remote)"),
            )),
        }
    }
}

/// Persisted backend selection: `{ "database_type": "local-file" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    pub database_type: BackendKind,
}

impl BackendConfig {
    /// Load the selection file, writing the default when it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or created.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = config_path(data_dir);
        if !path.exists() {
            let config = Self::default();
            debug!(path = %path.display(), "Config file not found, writing default");
            config.save(data_dir)?;
            info!(backend = %config.database_type, "Created default config");
            return Ok(config);
        }

        let contents = fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&contents).map_err(|err| {
            TicketError::Config(format!("cannot parse {}: {err}", path.display()))
        })?;
        debug!(backend = %config.database_type, "Config loaded");
        Ok(config)
    }

    /// Write the selection file, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let path = config_path(data_dir);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), backend = %self.database_type, "Config saved");
        Ok(())
    }
}

/// Credentials for the remote backend.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub url: Option<String>,
    pub auth_token: Option<String>,
}

impl fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("url", &self.url)
            .field("auth_token", &self.token_preview())
            .finish()
    }
}

impl RemoteCredentials {
    /// Read `TURSO_URL` and `TURSO_AUTH_TOKEN`. Blank values count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            env::var(TURSO_URL_ENV).ok(),
            env::var(TURSO_AUTH_TOKEN_ENV).ok(),
        )
    }

    #[must_use]
    pub fn from_values(url: Option<String>, auth_token: Option<String>) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            url: clean(url),
            auth_token: clean(auth_token),
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigMissing` naming the first absent variable.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_none() {
            return Err(missing(TURSO_URL_ENV));
        }
        if self.auth_token.is_none() {
            return Err(missing(TURSO_AUTH_TOKEN_ENV));
        }
        Ok(())
    }

    /// First characters of the token, safe to print.
    #[must_use]
    pub fn token_preview(&self) -> Option<String> {
        self.auth_token.as_ref().map(|token| {
            if token.chars().count() > TOKEN_PREVIEW_LEN {
                format!("{}...", token.chars().take(TOKEN_PREVIEW_LEN).collect::<String>())
            } else {
                "***".to_string()
            }
        })
    }
}

fn missing(variable: &str) -> TicketError {
    TicketError::ConfigMissing {
        backend: REMOTE.to_string(),
        what: format!("the {variable} environment variable"),
    }
}

/// Resolve the data directory: `$ALEXANDRIA_DIR`, else `$HOME/Alexandria`.
///
/// # Errors
///
/// Returns a config error if neither variable is set.
pub fn data_dir() -> Result<PathBuf> {
    data_dir_with_env(env::var_os(DATA_DIR_ENV), env::var_os("HOME"))
}

fn data_dir_with_env(dir_override: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = dir_override.filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home.filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(DATA_DIR_NAME))
        .ok_or_else(|| {
            TicketError::Config(format!("neither {DATA_DIR_ENV} nor HOME is set"))
        })
}

#[must_use]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME)
}

#[must_use]
pub fn default_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DEFAULT_DB_FILENAME)
}

#[must_use]
pub fn resolve_db_path(data_dir: &Path, db_override: Option<&Path>) -> PathBuf {
    db_override.map_or_else(|| default_db_path(data_dir), Path::to_path_buf)
}

/// Connection parameters for `kind`.
#[must_use]
pub fn connect_params(
    kind: BackendKind,
    data_dir: &Path,
    db_override: Option<&Path>,
    credentials: &RemoteCredentials,
) -> ConnectParams {
    match kind {
        BackendKind::LocalFile => ConnectParams::local(resolve_db_path(data_dir, db_override)),
        BackendKind::Remote => ConnectParams {
            db_path: None,
            remote_url: credentials.url.clone(),
            auth_token: credentials.auth_token.clone(),
        },
    }
}

/// Connect to an explicit backend kind.
///
/// # Errors
///
/// Returns a configuration, connection, or schema error.
pub fn open_store_with(
    kind: BackendKind,
    data_dir: &Path,
    db_override: Option<&Path>,
    credentials: &RemoteCredentials,
) -> Result<TicketStore> {
    let params = connect_params(kind, data_dir, db_override, credentials);
    BackendRegistry::with_defaults()
        .connect(kind.as_str(), &params)
        .map(TicketStore::new)
}

/// Load the backend selection and connect to it.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the backend cannot
/// be reached.
pub fn open_store(data_dir: &Path, db_override: Option<&Path>) -> Result<(TicketStore, BackendConfig)> {
    let config = BackendConfig::load(data_dir)?;
    let store = open_store_with(
        config.database_type,
        data_dir,
        db_override,
        &RemoteCredentials::from_env(),
    )?;
    Ok((store, config))
}

/// Persist a new backend selection after checking it can be used.
///
/// # Errors
///
/// Returns `ConfigMissing` when switching to `remote` without credentials;
/// the stored selection is left unchanged in that case.
pub fn switch_backend(
    data_dir: &Path,
    kind: BackendKind,
    credentials: &RemoteCredentials,
) -> Result<BackendConfig> {
    if kind == BackendKind::Remote {
        credentials.validate()?;
    }
    let config = BackendConfig {
        database_type: kind,
    };
    config.save(data_dir)?;
    info!(backend = %kind, "Switched database backend");
    Ok(config)
}
