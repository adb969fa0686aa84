use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use mb_crypto::AttestationDomain;
use mb_events::{JournalConfig, NoticeArchive};
use mb_ledger::StationLedger;

use crate::archive_task::drain_to_archive;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Meterbook ledger server.
///
/// Owns the one [`StationLedger`] for this deployment and serves its
/// operations over HTTP.
pub struct MbServer {
    config: ServerConfig,
    ledger: Arc<StationLedger>,
}

impl MbServer {
    /// Bootstrap a ledger from the configuration.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let domain = AttestationDomain::new(config.realm.clone(), config.ledger_account);
        let ledger = Arc::new(StationLedger::with_config(
            domain,
            config.admin_account,
            JournalConfig {
                channel_capacity: config.channel_capacity,
            },
        ));
        Ok(Self { config, ledger })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<StationLedger> {
        &self.ledger
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.ledger))
    }

    /// Start serving requests, archiving notices if configured.
    pub async fn serve(self) -> ServerResult<()> {
        if let Some(path) = &self.config.archive_path {
            let archive = NoticeArchive::open(path)?;
            tokio::spawn(drain_to_archive(
                Arc::clone(self.ledger.journal()),
                archive,
            ));
        }

        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!(
            addr = %self.config.bind_addr,
            realm = %self.config.realm,
            "meterbook server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mb_types::AccountId;

    fn config() -> ServerConfig {
        ServerConfig {
            admin_account: AccountId::from_raw([1; 32]),
            ..Default::default()
        }
    }

    #[test]
    fn server_bootstraps_admin_roles() {
        let server = MbServer::new(config()).unwrap();
        let admin = AccountId::from_raw([1; 32]);
        assert!(server
            .ledger()
            .has_role(&admin, mb_types::Role::Admin)
            .unwrap());
        assert_eq!(server.config().realm, "dev");
    }

    #[test]
    fn null_admin_is_rejected() {
        assert!(matches!(
            MbServer::new(ServerConfig::default()),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn router_builds() {
        let server = MbServer::new(config()).unwrap();
        let _router = server.router();
    }
}
