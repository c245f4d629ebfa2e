// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Thin HTTP clients for the upstream providers: GitHub (upstream OAuth
//! assertion), Tenderly (transaction simulation), Zapper (portfolio
//! GraphQL) and ORCID (public researcher record).

pub mod github;
pub mod orcid;
pub mod tenderly;
pub mod zapper;
