use nessus_client::ClientOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use sync_engine::SyncOptions;
use vault_core::SyncError;

pub const DEFAULT_CONFIG: &str = "scan-vault.yaml";
pub const DEFAULT_DB: &str = "scan-vault.db";
const DEFAULT_PORT: u16 = 8834;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct NessusConfig {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Include scans in the trash folder.
    pub trash: Option<bool>,
    /// Track compliance checks.
    pub compliance: Option<bool>,
    pub verify_tls: Option<bool>,
    pub timeout_ms: Option<u64>,
    pub qps: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub debug: Option<bool>,
    /// `compact`, `pretty` or `json`.
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub nessus: Option<NessusConfig>,
    pub database: Option<DatabaseConfig>,
    pub logging: Option<LoggingConfig>,
}

/// Load the YAML config. Without an explicit path, `./scan-vault.yaml` is
/// used when present and defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config, SyncError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG);
            if p.exists() { p.to_path_buf() } else { return Ok(Config::default()); }
        }
    };
    let s = fs::read_to_string(&path)
        .map_err(|e| SyncError::config(path.display().to_string(), e.to_string()))?;
    serde_yaml::from_str(&s).map_err(|e| SyncError::config(path.display().to_string(), e.to_string()))
}

// An empty path makes SQLite open a private temporary database.
fn non_empty_path(path: &Path) -> Result<(), SyncError> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(SyncError::config("database.path", "must be set"));
    }
    Ok(())
}

impl Config {
    fn nessus(&self) -> NessusConfig {
        self.nessus.clone().unwrap_or_default()
    }

    /// Reject settings that are present but unusable. Nessus credentials
    /// are checked by [`Config::client_options`] since only `sync` needs them.
    pub fn validate(&self) -> Result<(), SyncError> {
        if let Some(path) = self.database.as_ref().and_then(|d| d.path.as_deref()) {
            non_empty_path(path)?;
        }
        if self.nessus.as_ref().and_then(|n| n.port) == Some(0) {
            return Err(SyncError::config("nessus.port", "must be non-zero"));
        }
        Ok(())
    }

    pub fn database_path(&self, cli: Option<&Path>) -> Result<PathBuf, SyncError> {
        let path = cli
            .map(Path::to_path_buf)
            .or_else(|| self.database.as_ref().and_then(|d| d.path.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB));
        non_empty_path(&path)?;
        Ok(path)
    }

    pub fn debug(&self, cli: bool) -> bool {
        cli || self.logging.as_ref().and_then(|l| l.debug).unwrap_or(false)
    }

    pub fn log_format(&self) -> String {
        self.logging.as_ref().and_then(|l| l.format.clone()).unwrap_or_else(|| "compact".into())
    }

    /// CLI flags can only switch features on.
    pub fn sync_options(&self, trash: bool, compliance: bool) -> SyncOptions {
        let n = self.nessus();
        SyncOptions {
            include_trash: trash || n.trash.unwrap_or(false),
            compliance: compliance || n.compliance.unwrap_or(false),
        }
    }

    pub fn client_options(&self, compliance: bool) -> Result<ClientOptions, SyncError> {
        let n = self.nessus();
        let required = |value: Option<String>, field: &str| -> Result<String, SyncError> {
            match value.map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => Ok(v),
                _ => Err(SyncError::config(format!("nessus.{field}"), "must be set")),
            }
        };
        let port = n.port.unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(SyncError::config("nessus.port", "must be non-zero"));
        }
        Ok(ClientOptions {
            hostname: required(n.hostname, "hostname")?,
            port,
            access_key: required(n.access_key, "access_key")?,
            secret_key: required(n.secret_key, "secret_key")?,
            verify_tls: n.verify_tls.unwrap_or(false),
            timeout_ms: n.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            qps: n.qps.unwrap_or(0),
            compliance,
        })
    }
}
