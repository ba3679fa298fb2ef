//! Configuration for the HTTP surface
//!
//! Upstream settings live in `cinefeed-catalog`; this module only covers
//! where the server listens and which browser origins it answers.

use std::net::SocketAddr;

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Origin list that allows every origin
pub const ANY_ORIGIN: &str = "*";

/// Server settings resolved from flags and environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub allowed_origins: AllowedOrigins,
}

/// Cross-origin policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Any origin may call the API
    Any,
    /// Only these exact origins
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parse a comma-separated origin list, dropping blank entries
    ///
    /// `*` anywhere in the list, or an empty list, allows every origin.
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|origin| origin == ANY_ORIGIN) {
            Self::Any
        } else {
            Self::List(origins)
        }
    }
}

impl ServerConfig {
    pub fn new(bind: SocketAddr, allowed_origins: &str) -> Self {
        Self {
            bind,
            allowed_origins: AllowedOrigins::parse(allowed_origins),
        }
    }
}
