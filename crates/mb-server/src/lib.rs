//! HTTP surface for Meterbook.
//!
//! Serves every ledger operation as a JSON endpoint, with role
//! administration, health and info probes, and an optional background task
//! that archives the notice stream to disk. The server owns the ledger;
//! callers are authenticated by the deployment's perimeter and named
//! explicitly as `caller` in mutating request bodies.

pub mod archive_task;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::MbServer;
