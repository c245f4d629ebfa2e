// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Session and assertion handling.
//!
//! Two independent proofs establish a live session on the authorize
//! endpoint, checked in order:
//!
//! 1. an edge access-layer JWT cookie whose claims match the canonical
//!    identity ([`access`]),
//! 2. an opaque `idp_session` cookie backed by a store record
//!    ([`session`]).
//!
//! [`tokens`] builds the OIDC ID token issued at the token endpoint.

pub mod access;
pub mod session;
pub mod tokens;

pub use access::verify_access_jwt;
pub use session::{get_cookie, session_cookie_header, SESSION_COOKIE};
pub use tokens::build_id_token;
