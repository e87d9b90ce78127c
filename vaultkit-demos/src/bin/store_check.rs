//! Storage connectivity check
//!
//! Connects to the ciphertext store, inserts a sample row, and scans the
//! table back. No KMS calls are made; the vault arguments are accepted for
//! CLI uniformity with the other demos.
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
use tracing::info;
use vaultkit_config::AppConfig;
use vaultkit_demos::DemoArgs;
use vaultkit_logging::init_console_logging;
use vaultkit_store::CiphertextStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Argument validation happens before any connection attempt
    let args = DemoArgs::parse();

    init_console_logging("store-check", "info");

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    let database = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not configured"))?;

    info!(
        compartment_id = %args.compartment_id,
        vault_id = %args.vault_id,
        region = %args.region,
        "Received arguments"
    );

    let store = CiphertextStore::connect(&database.url, config.table_name()).await?;

    info!("Inserting a sample row");
    let id = store.insert("unassigned", "1234567890000000").await?;
    info!(id = id, "Inserted");

    info!("Reading stored information");
    for row in store.list_all().await? {
        info!(
            id = row.id,
            key_id = %row.key_id,
            payload = %row.payload,
            created_at = %row.created_at,
            "Row"
        );
    }

    info!("Done");
    Ok(())
}
