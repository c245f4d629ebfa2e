// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! # Runtime Configuration
//!
//! Environment variable names, protocol lifetimes, and the `GatewayConfig`
//! snapshot loaded at startup. Provider secrets are optional at boot: a
//! route that needs a missing secret answers `500 {"error":"<NAME> not
//! configured"}` per request instead of refusing to start.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `ISSUER` | Public base URL of this gateway | `https://bridgeworld.lol` |
//! | `GITHUB_CLIENT_ID` | Upstream GitHub OAuth app id | built-in app id |
//! | `GITHUB_CLIENT_SECRET` | Upstream GitHub OAuth secret | required for callback |
//! | `ALCHEMY_API_KEY` | Chain RPC key | required for chain routes |
//! | `TENDERLY_ACCESS_KEY` | Simulation provider key | required for simulate routes |
//! | `ZAPPER_API_KEY` | Portfolio provider key | required for portfolio routes |
//! | `SIGNING_KEY` | RSA private key PEM for RS256 ID tokens | unsigned fallback |
//! | `ACCESS_TEAM` | Edge access-layer team accepted in `iss` | `system76` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const ISSUER_ENV: &str = "ISSUER";
pub const GITHUB_CLIENT_ID_ENV: &str = "GITHUB_CLIENT_ID";
pub const GITHUB_CLIENT_SECRET_ENV: &str = "GITHUB_CLIENT_SECRET";
pub const ALCHEMY_API_KEY_ENV: &str = "ALCHEMY_API_KEY";
pub const TENDERLY_ACCESS_KEY_ENV: &str = "TENDERLY_ACCESS_KEY";
pub const ZAPPER_API_KEY_ENV: &str = "ZAPPER_API_KEY";
pub const SIGNING_KEY_ENV: &str = "SIGNING_KEY";
pub const ACCESS_TEAM_ENV: &str = "ACCESS_TEAM";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_ISSUER: &str = "https://bridgeworld.lol";
const DEFAULT_GITHUB_CLIENT_ID: &str = "Iv23lidKK1AZBPnKptV2";
const DEFAULT_ACCESS_TEAM: &str = "system76";

/// Lifetime of a pending authorization request awaiting upstream assertion.
pub const PENDING_TTL_SECS: u64 = 600;
/// Lifetime of an issued authorization code.
pub const CODE_TTL_SECS: u64 = 300;
/// Lifetime of an IdP session and of issued access/ID tokens.
pub const SESSION_TTL_SECS: u64 = 86_400;
/// Cache window for the on-chain verification verdict.
pub const ONCHAIN_CACHE_TTL_SECS: u64 = 300;
/// Cache window for the combined portfolio document.
pub const PORTFOLIO_CACHE_TTL_SECS: u64 = 600;
/// Per-call timeout for upstream provider and RPC requests.
pub const PROVIDER_TIMEOUT_SECS: u64 = 12;

/// Configuration snapshot taken from the environment at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Public base URL embedded in discovery documents, redirects and tokens.
    pub issuer: String,
    pub github_client_id: String,
    pub github_client_secret: Option<String>,
    pub alchemy_api_key: Option<String>,
    pub tenderly_access_key: Option<String>,
    pub zapper_api_key: Option<String>,
    /// RSA private key PEM. When absent, ID tokens are issued unsigned
    /// (`alg: "none"`) — a documented gap, not a production mode.
    pub signing_key_pem: Option<String>,
    /// Team identifier accepted as an `iss` substring on edge-access JWTs.
    pub access_team: String,
}

impl GatewayConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            issuer: env_or_default(ISSUER_ENV, DEFAULT_ISSUER),
            github_client_id: env_or_default(GITHUB_CLIENT_ID_ENV, DEFAULT_GITHUB_CLIENT_ID),
            github_client_secret: env_optional(GITHUB_CLIENT_SECRET_ENV),
            alchemy_api_key: env_optional(ALCHEMY_API_KEY_ENV),
            tenderly_access_key: env_optional(TENDERLY_ACCESS_KEY_ENV),
            zapper_api_key: env_optional(ZAPPER_API_KEY_ENV),
            signing_key_pem: env_optional(SIGNING_KEY_ENV),
            access_team: env_or_default(ACCESS_TEAM_ENV, DEFAULT_ACCESS_TEAM),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            github_client_id: DEFAULT_GITHUB_CLIENT_ID.to_string(),
            github_client_secret: None,
            alchemy_api_key: None,
            tenderly_access_key: None,
            zapper_api_key: None,
            signing_key_pem: None,
            access_team: DEFAULT_ACCESS_TEAM.to_string(),
        }
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_issuer_and_no_secrets() {
        let config = GatewayConfig::default();
        assert_eq!(config.issuer, "https://bridgeworld.lol");
        assert!(config.github_client_secret.is_none());
        assert!(config.alchemy_api_key.is_none());
        assert!(config.signing_key_pem.is_none());
    }

    #[test]
    fn ttls_match_protocol_contract() {
        assert_eq!(CODE_TTL_SECS, 300);
        assert_eq!(SESSION_TTL_SECS, 86_400);
        assert!(PENDING_TTL_SECS > CODE_TTL_SECS);
    }
}
