// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

//! Safe multisig read-only queries: owner list and signing threshold.

use std::str::FromStr;
use std::time::Duration;

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::client::{ChainClient, ChainError};
use crate::config::PROVIDER_TIMEOUT_SECS;

sol! {
    #[sol(rpc)]
    interface ISafe {
        function getOwners() external view returns (address[] memory);
        function getThreshold() external view returns (uint256);
    }
}

/// Safe contract wrapper.
pub struct SafeContract<P> {
    contract: ISafe::ISafeInstance<P>,
}

impl<P: Provider + Clone> SafeContract<P> {
    pub fn new(provider: &P, safe_address: &str) -> Result<Self, ChainError> {
        let address = Address::from_str(safe_address)
            .map_err(|e| ChainError::InvalidAddress(e.to_string()))?;
        Ok(Self {
            contract: ISafe::new(address, provider.clone()),
        })
    }

    pub async fn owners(&self) -> Result<Vec<String>, ChainError> {
        let owners = self
            .contract
            .getOwners()
            .call()
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;
        Ok(owners.iter().map(|a| a.to_string()).collect())
    }

    pub async fn threshold(&self) -> Result<u64, ChainError> {
        let threshold: U256 = self
            .contract
            .getThreshold()
            .call()
            .await
            .map_err(|e| ChainError::RpcError(e.to_string()))?;
        Ok(saturating_u64(threshold))
    }
}

/// An arbitrary contract may return any uint256 here; saturate rather
/// than panic on values past `u64::MAX`.
fn saturating_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Fetch the owner list and threshold concurrently.
///
/// Each leg times out and fails independently: one failure degrades its
/// own field to `None` and never suppresses the sibling result.
pub async fn owners_and_threshold(
    chain_id: u64,
    safe_address: &str,
    api_key: &str,
) -> (Option<Vec<String>>, Option<u64>) {
    let client = match ChainClient::new(chain_id, api_key) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("safe query setup failed on chain {chain_id}: {e}");
            return (None, None);
        }
    };
    let contract = match SafeContract::new(client.provider(), safe_address) {
        Ok(contract) => contract,
        Err(e) => {
            tracing::warn!("invalid safe address {safe_address}: {e}");
            return (None, None);
        }
    };

    let timeout = Duration::from_secs(PROVIDER_TIMEOUT_SECS);
    let (owners, threshold) = tokio::join!(
        tokio::time::timeout(timeout, contract.owners()),
        tokio::time::timeout(timeout, contract.threshold()),
    );

    let owners = match owners {
        Ok(Ok(list)) => Some(list),
        Ok(Err(e)) => {
            tracing::warn!("safe owners call failed: {e}");
            None
        }
        Err(_) => {
            tracing::warn!("safe owners call timed out");
            None
        }
    };
    let threshold = match threshold {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::warn!("safe threshold call failed: {e}");
            None
        }
        Err(_) => {
            tracing::warn!("safe threshold call timed out");
            None
        }
    };

    (owners, threshold)
}
