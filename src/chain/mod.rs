// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Read-only EVM access for on-chain identity verification.
//!
//! All chain traffic goes through per-chain Alchemy RPC endpoints with a
//! bounded per-call timeout. A failed or slow call degrades its field to
//! `None`/zero; it never fails a sibling call or the whole response.

pub mod client;
pub mod erc20;
pub mod networks;
pub mod safe;
pub mod verify;

pub use client::{format_units, ChainClient, ChainError};
pub use networks::{alchemy_rpc_url, chain_info, supported_chain_ids, ChainInfo, CHAINS};
pub use verify::{onchain_verification, resolve_ens};
