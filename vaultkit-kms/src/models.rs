//! Wire types for the KMS service API
//!
//! Field names follow the service's camelCase JSON conventions.
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


use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default AES key length in bytes
pub const DEFAULT_KEY_LENGTH: u32 = 32;

/// Lifecycle state of a vault, key, or key version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Creating,
    Enabling,
    Enabled,
    Disabling,
    Disabled,
    Updating,
    Deleting,
    Deleted,
    SchedulingDeletion,
    PendingDeletion,
    CancellingDeletion,
    #[serde(other)]
    Unknown,
}

impl LifecycleState {
    /// Whether the resource can serve management and crypto operations
    pub fn is_available(&self) -> bool {
        matches!(self, LifecycleState::Enabled)
    }
}

/// A vault: the logical container holding keys, with its two service
/// endpoints (management plane and crypto plane).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub id: String,
    pub compartment_id: String,
    pub display_name: String,
    pub management_endpoint: String,
    pub crypto_endpoint: String,
    pub lifecycle_state: LifecycleState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_created: Option<chrono::DateTime<chrono::Utc>>,
}

/// Shape of a key's cryptographic material
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyShape {
    pub algorithm: KeyAlgorithm,
    /// Key length in bytes
    pub length: u32,
}

impl Default for KeyShape {
    fn default() -> Self {
        Self {
            algorithm: KeyAlgorithm::Aes,
            length: DEFAULT_KEY_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyAlgorithm {
    Aes,
    Rsa,
    Ecdsa,
}

/// A master key held in a vault
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub id: String,
    pub compartment_id: String,
    pub display_name: String,
    pub vault_id: String,
    pub key_shape: KeyShape,
    pub lifecycle_state: LifecycleState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_key_version: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub freeform_tags: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_created: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_deletion: Option<chrono::DateTime<chrono::Utc>>,
}

/// Summary row returned by the list-keys operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySummary {
    pub id: String,
    pub compartment_id: String,
    pub display_name: String,
    pub vault_id: String,
    pub lifecycle_state: LifecycleState,
}

/// A key version (one generation of cryptographic material)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyVersion {
    pub id: String,
    pub key_id: String,
    pub vault_id: String,
    pub lifecycle_state: LifecycleState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_created: Option<chrono::DateTime<chrono::Utc>>,
}

/// Summary row returned by the list-key-versions operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyVersionSummary {
    pub id: String,
    pub key_id: String,
    pub vault_id: String,
    pub lifecycle_state: LifecycleState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_created: Option<chrono::DateTime<chrono::Utc>>,
}

/// Request body for create-key
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyDetails {
    pub compartment_id: String,
    pub display_name: String,
    pub key_shape: KeyShape,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub freeform_tags: HashMap<String, String>,
}

impl CreateKeyDetails {
    pub fn new(compartment_id: &str, display_name: &str) -> Self {
        Self {
            compartment_id: compartment_id.to_string(),
            display_name: display_name.to_string(),
            key_shape: KeyShape::default(),
            freeform_tags: HashMap::new(),
        }
    }

    pub fn with_freeform_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.freeform_tags = tags;
        self
    }
}

/// Request body for update-key
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKeyDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeform_tags: Option<HashMap<String, String>>,
}

/// Request body for schedule-key-deletion
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleKeyDeletionDetails {
    /// When omitted, the service applies its default deletion window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_deletion: Option<chrono::DateTime<chrono::Utc>>,
}

/// Request body for encrypt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptDataDetails {
    pub key_id: String,
    /// Base64-encoded plaintext
    pub plaintext: String,
    /// Optional context recorded in the service's audit log
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub logging_context: HashMap<String, String>,
}

/// Request body for decrypt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptDataDetails {
    pub key_id: String,
    pub ciphertext: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub logging_context: HashMap<String, String>,
}

/// Request body for generate-data-encryption-key
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKeyDetails {
    pub key_id: String,
    pub key_shape: KeyShape,
    /// When true, the response carries the plaintext data key alongside the
    /// wrapped one, for local envelope encryption
    pub include_plaintext_key: bool,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub logging_context: HashMap<String, String>,
}

/// Response payload of encrypt
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedData {
    pub ciphertext: String,
}

/// Response payload of decrypt
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedData {
    /// Base64-encoded plaintext
    pub plaintext: String,
}

/// Response payload of generate-data-encryption-key
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedKey {
    /// Data key wrapped under the master key
    pub ciphertext: String,
    /// Base64-encoded plaintext data key, present when requested
    #[serde(default)]
    pub plaintext: Option<String>,
}

/// Error body returned by the service on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_deserialization() {
        let json = r#"{
            "id": "key-1",
            "compartmentId": "cmp-1",
            "displayName": "demo-key",
            "vaultId": "vault-1",
            "keyShape": { "algorithm": "AES", "length": 32 },
            "lifecycleState": "CREATING",
            "currentKeyVersion": "ver-1",
            "freeformTags": { "team": "payments" },
            "timeCreated": "2025-06-01T12:00:00Z"
        }"#;

        let key: Key = serde_json::from_str(json).unwrap();
        assert_eq!(key.id, "key-1");
        assert_eq!(key.key_shape.length, 32);
        assert_eq!(key.lifecycle_state, LifecycleState::Creating);
        assert!(!key.lifecycle_state.is_available());
        assert_eq!(key.freeform_tags.get("team").unwrap(), "payments");
    }

    #[test]
    fn test_unknown_lifecycle_state() {
        let state: LifecycleState = serde_json::from_str("\"BACKFILLING\"").unwrap();
        assert_eq!(state, LifecycleState::Unknown);
    }

    #[test]
    fn test_create_key_details_wire_names() {
        let details = CreateKeyDetails::new("cmp-1", "demo-key");
        let json = serde_json::to_value(&details).unwrap();

        assert_eq!(json["compartmentId"], "cmp-1");
        assert_eq!(json["displayName"], "demo-key");
        assert_eq!(json["keyShape"]["algorithm"], "AES");
        assert_eq!(json["keyShape"]["length"], 32);
        // Empty tags are omitted from the wire
        assert!(json.get("freeformTags").is_none());
    }

    #[test]
    fn test_update_key_empty_tags_clear_instead_of_omit() {
        // Some(empty map) must reach the wire as {} so the service clears
        // the tags; None means "leave them alone" and is omitted.
        let reset = UpdateKeyDetails {
            display_name: None,
            freeform_tags: Some(HashMap::new()),
        };
        let json = serde_json::to_value(&reset).unwrap();
        assert_eq!(json["freeformTags"], serde_json::json!({}));

        let untouched = UpdateKeyDetails::default();
        let json = serde_json::to_value(&untouched).unwrap();
        assert!(json.get("freeformTags").is_none());
    }

    #[test]
    fn test_schedule_deletion_omits_null_time() {
        let details = ScheduleKeyDeletionDetails::default();
        let json = serde_json::to_string(&details).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_generated_key_without_plaintext() {
        let json = r#"{ "ciphertext": "d3JhcHBlZA==" }"#;
        let generated: GeneratedKey = serde_json::from_str(json).unwrap();
        assert!(generated.plaintext.is_none());
    }
}
