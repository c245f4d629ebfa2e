// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Supported network directory.

/// A supported EVM network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain_id: u64,
    pub name: &'static str,
    /// Alchemy subdomain slug.
    pub slug: &'static str,
    /// Native asset symbol.
    pub native: &'static str,
    /// Tenderly gateway slug, where the simulation provider covers the chain.
    pub tenderly_slug: Option<&'static str>,
}

/// The primary networks this gateway serves.
pub const CHAINS: &[ChainInfo] = &[
    ChainInfo { chain_id: 1, name: "Ethereum", slug: "eth-mainnet", native: "ETH", tenderly_slug: Some("mainnet") },
    ChainInfo { chain_id: 42161, name: "Arbitrum", slug: "arb-mainnet", native: "ETH", tenderly_slug: Some("arbitrum") },
    ChainInfo { chain_id: 137, name: "Polygon", slug: "polygon-mainnet", native: "POL", tenderly_slug: Some("polygon") },
    ChainInfo { chain_id: 8453, name: "Base", slug: "base-mainnet", native: "ETH", tenderly_slug: Some("base") },
    ChainInfo { chain_id: 534352, name: "Scroll", slug: "scroll-mainnet", native: "ETH", tenderly_slug: Some("scroll") },
    ChainInfo { chain_id: 324, name: "zkSync", slug: "zksync-mainnet", native: "ETH", tenderly_slug: Some("zksync") },
    ChainInfo { chain_id: 2020, name: "Ronin", slug: "ronin-mainnet", native: "RON", tenderly_slug: None },
];

/// Chain the canonical Safe is deployed on.
pub const SAFE_HOME_CHAIN: u64 = 42161;

/// Chains the canonical Safe is deployed to (directory data only).
pub const SAFE_DEPLOYED_CHAINS: &[u64] = &[
    1, 10, 100, 130, 137, 480, 8453, 42161, 42220, 43114, 57073, 59144, 534352, 1313161554,
];

pub fn chain_info(chain_id: u64) -> Option<&'static ChainInfo> {
    CHAINS.iter().find(|c| c.chain_id == chain_id)
}

pub fn supported_chain_ids() -> Vec<u64> {
    CHAINS.iter().map(|c| c.chain_id).collect()
}

/// Alchemy RPC URL for a chain, `None` when the chain is unsupported.
pub fn alchemy_rpc_url(chain_id: u64, api_key: &str) -> Option<String> {
    chain_info(chain_id).map(|c| format!("https://{}.g.alchemy.com/v2/{}", c.slug, api_key))
}
