//! Key management-plane client: key lifecycle and rotation
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
use crate::models::{
    CreateKeyDetails, Key, KeySummary, KeyVersion, KeyVersionSummary,
    ScheduleKeyDeletionDetails, UpdateKeyDetails,
};
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize)]
struct ItemsPage<T> {
    items: Vec<T>,
}

/// Client for a vault's management endpoint.
///
/// Every mutation here is rejected by the service while the key is in a
/// transitional state; callers wrap them in [`crate::retry::wait_for_key`].
pub struct KeyManagementClient {
    transport: ApiTransport,
    endpoint: String,
}

impl KeyManagementClient {
    /// Create a client for a vault's management endpoint (from
    /// [`crate::models::Vault::management_endpoint`])
    pub fn new(credentials: &Credentials, endpoint: &str, timeout_seconds: u64) -> Self {
        Self {
            transport: ApiTransport::new(&credentials.token, timeout_seconds),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Create a new master key in the vault
    pub async fn create_key(&self, details: &CreateKeyDetails) -> KmsResult<Key> {
        let url = format!("{}/v1/keys", self.endpoint);
        let key: Key = self.transport.post(&url, details).await?;
        info!(key_id = %key.id, display_name = %key.display_name, "Key created");
        Ok(key)
    }

    /// Fetch a key by id
    pub async fn get_key(&self, key_id: &str) -> KmsResult<Key> {
        let url = format!("{}/v1/keys/{}", self.endpoint, key_id);
        self.transport.get(&url).await
    }

    /// List keys in a compartment
    pub async fn list_keys(&self, compartment_id: &str) -> KmsResult<Vec<KeySummary>> {
        let url = format!("{}/v1/keys", self.endpoint);
        let page: ItemsPage<KeySummary> = self
            .transport
            .get_with_query(&url, &[("compartmentId", compartment_id)])
            .await?;
        Ok(page.items)
    }

    /// Update a key's display name and/or freeform tags
    pub async fn update_key(&self, key_id: &str, details: &UpdateKeyDetails) -> KmsResult<Key> {
        let url = format!("{}/v1/keys/{}", self.endpoint, key_id);
        let key: Key = self.transport.put(&url, details).await?;
        info!(key_id = %key.id, "Key updated");
        Ok(key)
    }

    /// Enable a disabled key
    pub async fn enable_key(&self, key_id: &str) -> KmsResult<Key> {
        let url = format!("{}/v1/keys/{}/actions/enable", self.endpoint, key_id);
        let key: Key = self.transport.post_empty(&url).await?;
        info!(key_id = %key.id, "Key enabled");
        Ok(key)
    }

    /// Disable an enabled key
    pub async fn disable_key(&self, key_id: &str) -> KmsResult<Key> {
        let url = format!("{}/v1/keys/{}/actions/disable", self.endpoint, key_id);
        let key: Key = self.transport.post_empty(&url).await?;
        info!(key_id = %key.id, "Key disabled");
        Ok(key)
    }

    /// Schedule a key for deletion after the service's deletion window
    pub async fn schedule_key_deletion(
        &self,
        key_id: &str,
        details: &ScheduleKeyDeletionDetails,
    ) -> KmsResult<Key> {
        let url = format!(
            "{}/v1/keys/{}/actions/scheduleDeletion",
            self.endpoint, key_id
        );
        let key: Key = self.transport.post(&url, details).await?;
        info!(
            key_id = %key.id,
            time_of_deletion = ?key.time_of_deletion,
            "Key scheduled for deletion"
        );
        Ok(key)
    }

    /// Cancel a pending key deletion
    pub async fn cancel_key_deletion(&self, key_id: &str) -> KmsResult<Key> {
        let url = format!(
            "{}/v1/keys/{}/actions/cancelDeletion",
            self.endpoint, key_id
        );
        let key: Key = self.transport.post_empty(&url).await?;
        info!(key_id = %key.id, "Key deletion cancelled");
        Ok(key)
    }

    /// Rotate a key by creating a new key version
    pub async fn create_key_version(&self, key_id: &str) -> KmsResult<KeyVersion> {
        let url = format!("{}/v1/keys/{}/keyVersions", self.endpoint, key_id);
        let version: KeyVersion = self.transport.post_empty(&url).await?;
        info!(
            key_id = key_id,
            key_version_id = %version.id,
            "Key rotated to a new version"
        );
        Ok(version)
    }

    /// List all versions of a key
    pub async fn list_key_versions(&self, key_id: &str) -> KmsResult<Vec<KeyVersionSummary>> {
        let url = format!("{}/v1/keys/{}/keyVersions", self.endpoint, key_id);
        let page: ItemsPage<KeyVersionSummary> = self.transport.get(&url).await?;
        Ok(page.items)
    }
}
