//! KMS client binding for vaultkit
//!
//! Typed clients for the three planes of the managed key service (vault
//! lookup, key lifecycle, envelope crypto), the bounded-retry helper for
//! operations on keys still becoming available, and a local envelope
//! encryption helper for data-encryption keys.
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


pub mod credentials;
pub mod crypto;
pub mod envelope;
pub mod error;
mod http;
pub mod management;
pub mod models;
pub mod retry;
pub mod vault;

pub use credentials::Credentials;
pub use crypto::KeyCryptoClient;
pub use error::{KmsError, KmsResult};
pub use management::KeyManagementClient;
pub use models::{
    CreateKeyDetails, Key, KeyShape, KeySummary, KeyVersion, KeyVersionSummary, LifecycleState,
    ScheduleKeyDeletionDetails, UpdateKeyDetails, Vault,
};
pub use retry::{wait_for_key, WaitConfig};
pub use vault::VaultClient;
