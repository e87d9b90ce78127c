//! Crypto-plane client: encrypt, decrypt, data-encryption-key generation
//!
//! Plaintext crosses the wire base64-encoded; [`encrypt_string`] and
//! [`decrypt_string`] take care of the encoding layer so round trips are
//! byte-exact.
//!
//! [`encrypt_string`]: KeyCryptoClient::encrypt_string
//! [`decrypt_string`]: KeyCryptoClient::decrypt_string
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
use crate::error::{KmsError, KmsResult};
use crate::http::ApiTransport;
use crate::models::{
    DecryptDataDetails, DecryptedData, EncryptDataDetails, EncryptedData, GenerateKeyDetails,
    GeneratedKey, KeyShape,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::collections::HashMap;
use tracing::debug;

/// Client for a vault's crypto endpoint
pub struct KeyCryptoClient {
    transport: ApiTransport,
    endpoint: String,
    logging_context: HashMap<String, String>,
}

impl KeyCryptoClient {
    /// Create a client for a vault's crypto endpoint (from
    /// [`crate::models::Vault::crypto_endpoint`])
    pub fn new(credentials: &Credentials, endpoint: &str, timeout_seconds: u64) -> Self {
        Self {
            transport: ApiTransport::new(&credentials.token, timeout_seconds),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            logging_context: HashMap::new(),
        }
    }

    /// Attach a logging context recorded in the service's audit log on
    /// every request issued through the convenience helpers
    pub fn with_logging_context(mut self, context: HashMap<String, String>) -> Self {
        self.logging_context = context;
        self
    }

    /// Encrypt base64-encoded plaintext under a master key
    pub async fn encrypt(&self, details: &EncryptDataDetails) -> KmsResult<EncryptedData> {
        let url = format!("{}/v1/encrypt", self.endpoint);
        self.transport.post(&url, details).await
    }

    /// Decrypt ciphertext; the response plaintext is base64-encoded
    pub async fn decrypt(&self, details: &DecryptDataDetails) -> KmsResult<DecryptedData> {
        let url = format!("{}/v1/decrypt", self.endpoint);
        self.transport.post(&url, details).await
    }

    /// Generate a data-encryption key wrapped under the master key
    pub async fn generate_data_encryption_key(
        &self,
        details: &GenerateKeyDetails,
    ) -> KmsResult<GeneratedKey> {
        let url = format!("{}/v1/generateDataEncryptionKey", self.endpoint);
        self.transport.post(&url, details).await
    }

    /// Encrypt a UTF-8 string, handling the base64 layer. Returns the
    /// service ciphertext.
    pub async fn encrypt_string(&self, key_id: &str, plaintext: &str) -> KmsResult<String> {
        let details = self.encrypt_details(key_id, plaintext);
        let encrypted = self.encrypt(&details).await?;
        debug!(key_id = key_id, "Payload encrypted");
        Ok(encrypted.ciphertext)
    }

    /// Decrypt service ciphertext back to the original UTF-8 string
    pub async fn decrypt_string(&self, key_id: &str, ciphertext: &str) -> KmsResult<String> {
        let details = self.decrypt_details(key_id, ciphertext);
        let decrypted = self.decrypt(&details).await?;
        let bytes = STANDARD.decode(decrypted.plaintext.as_bytes())?;
        String::from_utf8(bytes)
            .map_err(|e| KmsError::InvalidResponse(format!("Plaintext is not UTF-8: {}", e)))
    }

    /// Generate a 256-bit AES data key, including the plaintext half, and
    /// return (plaintext key bytes, wrapped key ciphertext)
    pub async fn generate_aes_data_key(&self, key_id: &str) -> KmsResult<(Vec<u8>, String)> {
        let details = self.generate_details(key_id);
        let generated = self.generate_data_encryption_key(&details).await?;
        let plaintext_b64 = generated.plaintext.ok_or_else(|| {
            KmsError::InvalidResponse(
                "Service omitted the plaintext data key despite includePlaintextKey".to_string(),
            )
        })?;
        let plaintext = STANDARD.decode(plaintext_b64.as_bytes())?;
        Ok((plaintext, generated.ciphertext))
    }

    fn encrypt_details(&self, key_id: &str, plaintext: &str) -> EncryptDataDetails {
        EncryptDataDetails {
            key_id: key_id.to_string(),
            plaintext: STANDARD.encode(plaintext.as_bytes()),
            logging_context: self.logging_context.clone(),
        }
    }

    fn decrypt_details(&self, key_id: &str, ciphertext: &str) -> DecryptDataDetails {
        DecryptDataDetails {
            key_id: key_id.to_string(),
            ciphertext: ciphertext.to_string(),
            logging_context: self.logging_context.clone(),
        }
    }

    fn generate_details(&self, key_id: &str) -> GenerateKeyDetails {
        GenerateKeyDetails {
            key_id: key_id.to_string(),
            key_shape: KeyShape::default(),
            include_plaintext_key: true,
            logging_context: self.logging_context.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_context() -> KeyCryptoClient {
        let credentials = Credentials {
            token: "tok".to_string(),
            endpoint: "https://kms.{region}.example-cloud.com".to_string(),
        };
        let mut context = HashMap::new();
        context.insert("origin".to_string(), "vaultkit-demo".to_string());
        KeyCryptoClient::new(&credentials, "https://crypto.example/", 5)
            .with_logging_context(context)
    }

    #[test]
    fn test_logging_context_on_encrypt_requests() {
        let client = client_with_context();

        let details = client.encrypt_details("key-1", "payload");
        assert_eq!(details.logging_context.get("origin").unwrap(), "vaultkit-demo");
        // The base64 layer is applied here, not by the caller
        assert_eq!(details.plaintext, STANDARD.encode(b"payload"));
    }

    #[test]
    fn test_logging_context_on_decrypt_and_generate_requests() {
        let client = client_with_context();

        let decrypt = client.decrypt_details("key-1", "Y2lwaGVy");
        assert_eq!(decrypt.logging_context.get("origin").unwrap(), "vaultkit-demo");

        let generate = client.generate_details("key-1");
        assert_eq!(generate.logging_context.get("origin").unwrap(), "vaultkit-demo");
        assert!(generate.include_plaintext_key);
    }

    #[test]
    fn test_context_empty_by_default() {
        let credentials = Credentials {
            token: "tok".to_string(),
            endpoint: "https://kms.{region}.example-cloud.com".to_string(),
        };
        let client = KeyCryptoClient::new(&credentials, "https://crypto.example", 5);
        assert!(client.encrypt_details("key-1", "p").logging_context.is_empty());
    }
}
