//! Local envelope encryption under a service-generated data key
//!
//! The service generates a data-encryption key and returns it twice: in
//! plaintext and wrapped under the master key. The plaintext half seals the
//! payload locally with AES-256-GCM; only the wrapped half is persisted
//! alongside the ciphertext.
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


use crate::error::{KmsError, KmsResult};
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};

/// AES-256-GCM key length in bytes
const DATA_KEY_LEN: usize = 32;

/// GCM nonce length in bytes, prepended to the ciphertext
const NONCE_LEN: usize = 12;

/// A payload sealed under a data key: the base64 ciphertext plus the
/// service-wrapped data key needed to open it later.
#[derive(Debug, Clone)]
pub struct SealedPayload {
    /// base64(nonce || AES-GCM ciphertext)
    pub ciphertext: String,
    /// Data key wrapped under the master key, as returned by the service
    pub wrapped_key: String,
}

/// Seal a payload with a plaintext data key
pub fn seal(data_key: &[u8], wrapped_key: &str, payload: &[u8]) -> KmsResult<SealedPayload> {
    let cipher = cipher_for(data_key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, payload)
        .map_err(|e| KmsError::Encryption(format!("Envelope seal failed: {}", e)))?;

    // Prepend nonce to ciphertext
    let mut blob = nonce.to_vec();
    blob.extend_from_slice(&ciphertext);

    Ok(SealedPayload {
        ciphertext: STANDARD.encode(blob),
        wrapped_key: wrapped_key.to_string(),
    })
}

/// Open a sealed payload with the (unwrapped) plaintext data key
pub fn open(data_key: &[u8], ciphertext_b64: &str) -> KmsResult<Vec<u8>> {
    let blob = STANDARD.decode(ciphertext_b64.as_bytes())?;
    if blob.len() < NONCE_LEN {
        return Err(KmsError::Decryption(
            "Sealed payload too short".to_string(),
        ));
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);
    let cipher = cipher_for(data_key)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| KmsError::Decryption(format!("Envelope open failed: {}", e)))
}

fn cipher_for(data_key: &[u8]) -> KmsResult<Aes256Gcm> {
    if data_key.len() != DATA_KEY_LEN {
        return Err(KmsError::Encryption(format!(
            "Data key must be {} bytes, got {}",
            DATA_KEY_LEN,
            data_key.len()
        )));
    }
    let mut key = [0u8; DATA_KEY_LEN];
    key.copy_from_slice(data_key);
    Ok(Aes256Gcm::new(&key.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    fn random_key() -> [u8; DATA_KEY_LEN] {
        let mut key = [0u8; DATA_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        key
    }

    #[test]
    fn test_seal_open_round_trip() {
        let key = random_key();
        let payload = b"John Doe,600600600,01-01-2000,Bank of America,1234567890000000";

        let sealed = seal(&key, "wrapped-dek", payload).unwrap();
        let opened = open(&key, &sealed.ciphertext).unwrap();

        assert_eq!(opened, payload);
        assert_eq!(sealed.wrapped_key, "wrapped-dek");
    }

    #[test]
    fn test_distinct_nonces_per_seal() {
        let key = random_key();
        let a = seal(&key, "w", b"payload").unwrap();
        let b = seal(&key, "w", b"payload").unwrap();
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_open_with_wrong_key_fails() {
        let sealed = seal(&random_key(), "w", b"payload").unwrap();
        let err = open(&random_key(), &sealed.ciphertext).unwrap_err();
        assert!(matches!(err, KmsError::Decryption(_)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = random_key();
        let sealed = seal(&key, "w", b"payload").unwrap();

        let mut blob = STANDARD.decode(sealed.ciphertext.as_bytes()).unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        let tampered = STANDARD.encode(blob);

        assert!(open(&key, &tampered).is_err());
    }

    #[test]
    fn test_short_key_rejected() {
        let err = seal(&[0u8; 16], "w", b"payload").unwrap_err();
        assert!(matches!(err, KmsError::Encryption(_)));
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let key = random_key();
        let err = open(&key, &STANDARD.encode([0u8; 4])).unwrap_err();
        assert!(matches!(err, KmsError::Decryption(_)));
    }
}
