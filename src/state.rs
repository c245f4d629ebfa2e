// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Bridgeworld

use std::sync::Arc;
use std::time::Duration;

use crate::config::{GatewayConfig, PROVIDER_TIMEOUT_SECS};
use crate::identity::CanonicalIdentity;
use crate::store::KvStore;

/// Shared application state. Cheap to clone; handlers hold no other
/// mutable state — everything short-lived goes through the store.
#[derive(Clone)]
pub struct AppState {
    pub store: KvStore,
    pub identity: Arc<CanonicalIdentity>,
    pub config: Arc<GatewayConfig>,
    /// Shared HTTP client for upstream providers; per-request timeout
    /// bounds every outbound call.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(identity: CanonicalIdentity, config: GatewayConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            store: KvStore::new(),
            identity: Arc::new(identity),
            config: Arc::new(config),
            http,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(CanonicalIdentity::default(), GatewayConfig::default())
    }
}
