// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Bridgeworld identity gateway.
//!
//! A single-tenant identity provider: OAuth 2.0 / OIDC and SAML 2.0
//! endpoints that always authenticate one canonical subject, with GitHub
//! as the upstream assertion provider, on-chain verification of the
//! subject's ENS/EOA/Safe binding, and portfolio/simulation proxies.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum)
//! - `auth` - Session cookies, access JWTs, ID token builder
//! - `chain` - Read-only EVM access (alloy)
//! - `providers` - Upstream HTTP clients (GitHub, Tenderly, Zapper, ORCID)
//! - `store` - TTL'd key-value store for protocol artifacts

pub mod api;
pub mod auth;
pub mod chain;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod providers;
pub mod state;
pub mod store;
