//! Vault control-plane client
// Copyright 2025 Vaultkit Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::credentials::Credentials;
use crate::error::KmsResult;
use crate::http::ApiTransport;
use crate::models::Vault;
use tracing::info;

/// Client for the region-scoped vault control plane.
///
/// Vault lookup is the entry point of every demo: the vault record carries
/// the management and crypto endpoints the other two clients talk to.
pub struct VaultClient {
    transport: ApiTransport,
    base_url: String,
}

impl VaultClient {
    /// Create a client for the given region
    pub fn new(credentials: &Credentials, region: &str, timeout_seconds: u64) -> Self {
        Self {
            transport: ApiTransport::new(&credentials.token, timeout_seconds),
            base_url: credentials.control_plane_endpoint(region),
        }
    }

    /// Fetch a vault by id
    pub async fn get_vault(&self, vault_id: &str) -> KmsResult<Vault> {
        let url = format!("{}/v1/vaults/{}", self.base_url, vault_id);
        let vault: Vault = self.transport.get(&url).await?;
        info!(
            vault_id = %vault.id,
            display_name = %vault.display_name,
            lifecycle_state = ?vault.lifecycle_state,
            "Vault retrieved"
        );
        Ok(vault)
    }
}
