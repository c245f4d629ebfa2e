// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Per-chain read-only RPC client.

use std::str::FromStr;
use std::time::Duration;

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};

use super::networks::{alchemy_rpc_url, chain_info, ChainInfo};
use crate::config::PROVIDER_TIMEOUT_SECS;

/// HTTP provider type (with all fillers).
pub type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Read-only client for one supported chain.
pub struct ChainClient {
    chain: &'static ChainInfo,
    provider: HttpProvider,
}

impl ChainClient {
    /// Connect to a chain through its Alchemy endpoint.
    pub fn new(chain_id: u64, api_key: &str) -> Result<Self, ChainError> {
        let chain = chain_info(chain_id).ok_or(ChainError::UnsupportedChain(chain_id))?;
        let rpc_url = alchemy_rpc_url(chain_id, api_key)
            .ok_or(ChainError::UnsupportedChain(chain_id))?;
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self { chain, provider })
    }

    /// Native balance in wei, bounded by the provider timeout.
    pub async fn native_balance(&self, address: &str) -> Result<U256, ChainError> {
        let addr = Address::from_str(address)
            .map_err(|e| ChainError::InvalidAddress(e.to_string()))?;

        let call = self.provider.get_balance(addr);
        tokio::time::timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS), call)
            .await
            .map_err(|_| ChainError::Timeout)?
            .map_err(|e| ChainError::RpcError(e.to_string()))
    }

    pub fn chain(&self) -> &'static ChainInfo {
        self.chain
    }

    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }
}

/// Format a raw amount as a fixed six-decimal string of whole token units.
///
/// `1e18` wei with 18 decimals renders as `"1.000000"`.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    if divisor.is_zero() {
        return amount.to_string();
    }
    let whole = amount / divisor;
    let frac = (amount % divisor) * U256::from(1_000_000u64) / divisor;
    format!("{whole}.{frac:0>6}")
}

/// Errors from read-only chain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("chain {0} not supported")]
    UnsupportedChain(u64),

    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("RPC call timed out")]
    Timeout,
}
