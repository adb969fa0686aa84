use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mb_types::AccountId;

use crate::error::{ServerError, ServerResult};

/// Server configuration.
///
/// `realm` and `ledger_account` fix the attestation domain this instance
/// verifies snapshot submissions under; `admin_account` receives the
/// bootstrap roles.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Deployment name bound into every attestation digest.
    pub realm: String,
    /// Identity this ledger instance answers to.
    pub ledger_account: AccountId,
    /// Principal granted Admin and SettlementSubmitter at bootstrap.
    pub admin_account: AccountId,
    /// Where to archive the notice stream; `None` disables archiving.
    pub archive_path: Option<PathBuf>,
    /// Capacity of per-subscriber notice channels.
    pub channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8096".parse().unwrap(),
            realm: "dev".into(),
            ledger_account: AccountId::null(),
            admin_account: AccountId::null(),
            archive_path: None,
            channel_capacity: 1024,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Reject configurations that cannot bootstrap a usable ledger.
    pub fn validate(&self) -> ServerResult<()> {
        if self.admin_account.is_null() {
            return Err(ServerError::Config(
                "admin_account must be set to a non-null account".into(),
            ));
        }
        if self.realm.is_empty() {
            return Err(ServerError::Config("realm must not be empty".into()));
        }
        Ok(())
    }
}
