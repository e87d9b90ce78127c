//! Shared plumbing for the demo binaries
//!
//! Every demo takes the same three positional arguments (compartment id,
//! vault id, region), loads credentials, resolves the vault, and builds the
//! management and crypto clients from the vault's endpoints.
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


use anyhow::Result;
use clap::Parser;
use std::collections::HashMap;
use tracing::info;
use vaultkit_config::AppConfig;
use vaultkit_kms::{
    Credentials, KeyCryptoClient, KeyManagementClient, Vault, VaultClient, WaitConfig,
};

/// Sample payload encrypted by the crypto and end-to-end demos
pub const SAMPLE_PAYLOAD: &str = "John Doe,600600600,01-01-2000,Bank of America,1234567890000000";

/// Common demo arguments
#[derive(Debug, Parser)]
#[command(about = "Cloud KMS demo", long_about = None)]
pub struct DemoArgs {
    /// Compartment in which keys are created
    pub compartment_id: String,
    /// Vault holding the keys
    pub vault_id: String,
    /// Region the vault was created in
    pub region: String,
}

/// Everything a demo needs after the common setup sequence
pub struct DemoContext {
    pub config: AppConfig,
    pub vault: Vault,
    pub management: KeyManagementClient,
    pub crypto: KeyCryptoClient,
    pub wait: WaitConfig,
}

impl DemoContext {
    /// Authenticate, resolve the vault, and build the per-vault clients
    pub async fn connect(args: &DemoArgs) -> Result<Self> {
        let config = AppConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        info!(
            compartment_id = %args.compartment_id,
            vault_id = %args.vault_id,
            region = %args.region,
            "Received arguments"
        );
        info!("Any 404 or 401 errors are most likely due to incorrect ids or credentials");

        let credentials = Credentials::load(
            config.kms.profile_path.as_deref(),
            &config.kms.profile_name,
        )?;

        let vault_client =
            VaultClient::new(&credentials, &args.region, config.kms.timeout_seconds);
        let vault = vault_client.get_vault(&args.vault_id).await?;

        let management = KeyManagementClient::new(
            &credentials,
            &vault.management_endpoint,
            config.kms.timeout_seconds,
        );
        let crypto = KeyCryptoClient::new(
            &credentials,
            &vault.crypto_endpoint,
            config.kms.timeout_seconds,
        )
        .with_logging_context(demo_logging_context());

        Ok(Self {
            config,
            vault,
            management,
            crypto,
            wait: WaitConfig::default(),
        })
    }
}

/// Freeform tags attached to demo keys
pub fn demo_freeform_tags() -> HashMap<String, String> {
    let mut tags = HashMap::new();
    tags.insert("origin".to_string(), "vaultkit-demo".to_string());
    tags.insert("disposable".to_string(), "true".to_string());
    tags
}

/// Context recorded in the service's audit log for every crypto request
/// issued by the demos
pub fn demo_logging_context() -> HashMap<String, String> {
    let mut context = HashMap::new();
    context.insert("application".to_string(), "vaultkit-demo".to_string());
    context.insert("environment".to_string(), "test".to_string());
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_args_parse() {
        let args =
            DemoArgs::try_parse_from(["demo", "cmp-1", "vault-1", "us-phoenix-1"]).unwrap();
        assert_eq!(args.compartment_id, "cmp-1");
        assert_eq!(args.vault_id, "vault-1");
        assert_eq!(args.region, "us-phoenix-1");
    }

    #[test]
    fn test_too_few_args_rejected() {
        assert!(DemoArgs::try_parse_from(["demo", "cmp-1", "vault-1"]).is_err());
    }

    #[test]
    fn test_too_many_args_rejected() {
        assert!(DemoArgs::try_parse_from([
            "demo",
            "cmp-1",
            "vault-1",
            "us-phoenix-1",
            "extra"
        ])
        .is_err());
    }

    #[test]
    fn test_demo_tags() {
        let tags = demo_freeform_tags();
        assert_eq!(tags.get("origin").unwrap(), "vaultkit-demo");
    }

    #[test]
    fn test_demo_logging_context() {
        let context = demo_logging_context();
        assert_eq!(context.get("application").unwrap(), "vaultkit-demo");
        assert_eq!(context.get("environment").unwrap(), "test");
    }
}
