//! Serve command

use crate::config::ServerConfig;
use crate::server;
use anyhow::Result;
use cinefeed_catalog::CatalogClient;
use cinefeed_core::Error as CoreError;
use std::net::SocketAddr;

/// Build the catalog client and serve until interrupted
///
/// A missing credential fails here, before the listener is bound.
pub async fn run(bind: SocketAddr, allowed_origins: &str) -> Result<()> {
    let catalog = CatalogClient::new().map_err(CoreError::from)?;
    server::serve(ServerConfig::new(bind, allowed_origins), catalog).await
}
