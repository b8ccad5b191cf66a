// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the relay. Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PI_HOST` | Identity authority host | Required |
//! | `PI_PORT` | Identity authority port | `80` |
//! | `PI_TIMEOUT_SECS` | Upper bound for one upstream forward | `15` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, time::Duration};

use url::Url;

/// Environment variable name for the identity authority host.
pub const UPSTREAM_HOST_ENV: &str = "PI_HOST";

/// Environment variable name for the identity authority port.
pub const UPSTREAM_PORT_ENV: &str = "PI_PORT";

/// Environment variable name for the upstream forward timeout, in seconds.
pub const UPSTREAM_TIMEOUT_ENV: &str = "PI_TIMEOUT_SECS";

/// Environment variable name for the relay bind address.
pub const BIND_HOST_ENV: &str = "HOST";

/// Environment variable name for the relay bind port.
pub const BIND_PORT_ENV: &str = "PORT";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_UPSTREAM_PORT: u16 = 80;
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_BIND_PORT: u16 = 3000;

/// The only authority endpoint the relay ever talks to.
pub const UPSTREAM_CHECK_PATH: &str = "/validate/check";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings the relay binary needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Full URL of the authority's `/validate/check` endpoint.
    pub upstream_url: Url,
    /// Bound applied to every forwarded request.
    pub upstream_timeout: Duration,
    /// Address the relay listens on.
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl RelayConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get(UPSTREAM_HOST_ENV).ok_or(ConfigError::Missing(UPSTREAM_HOST_ENV))?;
        let port = match get(UPSTREAM_PORT_ENV) {
            Some(raw) => parse_port(UPSTREAM_PORT_ENV, &raw)?,
            None => DEFAULT_UPSTREAM_PORT,
        };
        let upstream_url = upstream_check_url(&host, port)?;

        let upstream_timeout = match get(UPSTREAM_TIMEOUT_ENV) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|e| ConfigError::Invalid {
                    var: UPSTREAM_TIMEOUT_ENV,
                    reason: format!("{e}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: UPSTREAM_TIMEOUT_ENV,
                        reason: "timeout must be at least one second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_UPSTREAM_TIMEOUT,
        };

        let bind_host = get(BIND_HOST_ENV).unwrap_or_else(|| DEFAULT_BIND_HOST.to_string());
        let bind_port = match get(BIND_PORT_ENV) {
            Some(raw) => parse_port(BIND_PORT_ENV, &raw)?,
            None => DEFAULT_BIND_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{bind_host}:{bind_port}")
                .parse()
                .map_err(|e| ConfigError::Invalid {
                    var: BIND_HOST_ENV,
                    reason: format!("{e}"),
                })?;

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            upstream_url,
            upstream_timeout,
            bind_addr,
            log_format,
        })
    }
}

/// Build `http://<host>:<port>/validate/check`.
pub fn upstream_check_url(host: &str, port: u16) -> Result<Url, ConfigError> {
    let mut url = Url::parse(&format!("http://{host}")).map_err(|e| ConfigError::Invalid {
        var: UPSTREAM_HOST_ENV,
        reason: e.to_string(),
    })?;
    url.set_port(Some(port)).map_err(|_| ConfigError::Invalid {
        var: UPSTREAM_PORT_ENV,
        reason: format!("port {port} cannot be used with host {host}"),
    })?;
    url.set_path(UPSTREAM_CHECK_PATH);
    Ok(url)
}

fn parse_port(var: &'static str, raw: &str) -> Result<u16, ConfigError> {
    raw.parse().map_err(|e| ConfigError::Invalid {
        var,
        reason: format!("{e}"),
    })
}
