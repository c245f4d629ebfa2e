// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Protocol records persisted in the key-value store, and shared response
//! shapes for the federation endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An authorize request parked while the caller authenticates upstream.
///
/// Keyed by `pending:<id>`; the pending id doubles as the `state`
/// parameter sent to GitHub so the callback can correlate the flow.
/// Deleted on first consumption.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingAuthorizationRequest {
    pub client_id: Option<String>,
    pub redirect_uri: String,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub scope: String,
}

/// An issued authorization code awaiting exchange at the token endpoint.
///
/// Keyed by `code:<code>`; single-use.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorizationCodeRecord {
    pub client_id: Option<String>,
    pub redirect_uri: String,
    pub nonce: Option<String>,
    pub scope: String,
    /// Unix milliseconds at issuance.
    pub created: i64,
}

/// A verified IdP session backing the `idp_session` cookie.
///
/// Keyed by `session:<id>`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdpSessionRecord {
    pub github_id: u64,
    pub github_login: String,
    pub canonical_email: String,
    /// Unix milliseconds at creation.
    pub created: i64,
}

/// Token endpoint response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub id_token: String,
    pub scope: String,
}

/// The on-chain cross-check verdict binding name, account and contract
/// wallet together. `None` fields mean the backing provider call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VerificationVerdict {
    pub ens_resolves_to_eoa: bool,
    pub eoa_owns_safe: bool,
    pub safe_threshold_1: bool,
    pub identity_chain_valid: bool,
}

impl VerificationVerdict {
    /// Derive the verdict from raw provider results. A failed call (`None`)
    /// degrades its field to `false`; it never aborts the verdict.
    pub fn derive(
        resolved_address: Option<&str>,
        eoa: &str,
        owners: Option<&[String]>,
        threshold: Option<u64>,
    ) -> Self {
        let ens_resolves_to_eoa = resolved_address
            .map(|addr| addr.eq_ignore_ascii_case(eoa))
            .unwrap_or(false);
        let eoa_owns_safe = owners
            .map(|list| list.iter().any(|o| o.eq_ignore_ascii_case(eoa)))
            .unwrap_or(false);
        let safe_threshold_1 = threshold == Some(1);

        Self {
            ens_resolves_to_eoa,
            eoa_owns_safe,
            safe_threshold_1,
            identity_chain_valid: ens_resolves_to_eoa && eoa_owns_safe,
        }
    }
}
