//! End-to-end demo
//!
//! The full workflow: two keys are created, the same payload is encrypted
//! under each and persisted, both rows are read back and decrypted, the
//! first key is rotated and exercised again, and finally both keys are
//! scheduled for deletion and the table contents are dumped.
//!
//! Store failures are logged and the demo continues, so the KMS portion can
//! be exercised without a reachable database.
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
use tracing::{error, info};
use vaultkit_demos::{demo_freeform_tags, DemoArgs, DemoContext, SAMPLE_PAYLOAD};
use vaultkit_kms::{wait_for_key, CreateKeyDetails, ScheduleKeyDeletionDetails};
use vaultkit_logging::init_console_logging;
use vaultkit_store::CiphertextStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Argument validation happens before any network call
    let args = DemoArgs::parse();

    init_console_logging("end-to-end", "info");
    let ctx = DemoContext::connect(&args).await?;

    let store = match &ctx.config.database {
        Some(database) => {
            match CiphertextStore::connect(&database.url, ctx.config.table_name()).await {
                Ok(store) => Some(store),
                Err(e) => {
                    error!(error = %e, "Ciphertext store unavailable, continuing without it");
                    None
                }
            }
        }
        None => {
            error!("DATABASE_URL not configured, continuing without the ciphertext store");
            None
        }
    };

    info!("1: Creating key 1");
    let details = CreateKeyDetails::new(&args.compartment_id, "VAULTKIT_DEMO_E2E_KEY1")
        .with_freeform_tags(demo_freeform_tags());
    let key1 = ctx.management.create_key(&details).await?.id;

    info!("2: Encrypting payload under key 1");
    let ciphertext1 = wait_for_key(&ctx.wait, &key1, || {
        Box::pin(ctx.crypto.encrypt_string(&key1, SAMPLE_PAYLOAD))
    })
    .await?;

    info!("3: Persisting ciphertext 1");
    persist(store.as_ref(), &key1, &ciphertext1).await;

    info!("4: Creating key 2");
    let details = CreateKeyDetails::new(&args.compartment_id, "VAULTKIT_DEMO_E2E_KEY2")
        .with_freeform_tags(demo_freeform_tags());
    let key2 = ctx.management.create_key(&details).await?.id;

    info!("5: Encrypting payload under key 2 and persisting");
    let ciphertext2 = wait_for_key(&ctx.wait, &key2, || {
        Box::pin(ctx.crypto.encrypt_string(&key2, SAMPLE_PAYLOAD))
    })
    .await?;
    persist(store.as_ref(), &key2, &ciphertext2).await;

    info!("6: Reading ciphertexts back from the store");
    let mut stored = Vec::new();
    if let Some(store) = store.as_ref() {
        for key_id in [&key1, &key2] {
            match store.find_by_key(key_id).await {
                Ok(rows) => stored.extend(rows),
                Err(e) => error!(key_id = %key_id, error = %e, "Store query failed"),
            }
        }
    }
    // Fall back to the in-memory ciphertexts when the store is down
    let pairs: Vec<(String, String)> = if stored.is_empty() {
        vec![
            (key1.clone(), ciphertext1.clone()),
            (key2.clone(), ciphertext2.clone()),
        ]
    } else {
        stored
            .iter()
            .map(|row| (row.key_id.clone(), row.payload.clone()))
            .collect()
    };

    info!("7: Decrypting all payloads under their keys");
    for (key_id, ciphertext) in &pairs {
        let plaintext = wait_for_key(&ctx.wait, key_id, || {
            Box::pin(ctx.crypto.decrypt_string(key_id, ciphertext))
        })
        .await?;
        anyhow::ensure!(
            plaintext == SAMPLE_PAYLOAD,
            "Decrypted payload under key {} does not match the original",
            key_id
        );
        info!(key_id = %key_id, "Decrypted payload matches the original");
    }

    info!("8: Rotating key 1");
    let version = wait_for_key(&ctx.wait, &key1, || {
        Box::pin(ctx.management.create_key_version(&key1))
    })
    .await?;
    info!(key_version_id = %version.id, "Key 1 rotated");

    info!("9: Encrypt/decrypt round trip under the rotated key");
    let ciphertext3 = wait_for_key(&ctx.wait, &key1, || {
        Box::pin(ctx.crypto.encrypt_string(&key1, SAMPLE_PAYLOAD))
    })
    .await?;
    let decrypted3 = wait_for_key(&ctx.wait, &key1, || {
        Box::pin(ctx.crypto.decrypt_string(&key1, &ciphertext3))
    })
    .await?;
    anyhow::ensure!(
        decrypted3 == SAMPLE_PAYLOAD,
        "Round trip under the rotated key does not match the original"
    );
    info!("Round trip under the rotated key verified");

    info!("10: Scheduling both keys for deletion");
    let deletion = ScheduleKeyDeletionDetails::default();
    for key_id in [&key1, &key2] {
        wait_for_key(&ctx.wait, key_id, || {
            Box::pin(ctx.management.schedule_key_deletion(key_id, &deletion))
        })
        .await?;
    }

    info!("11: Dumping the ciphertext table");
    if let Some(store) = store.as_ref() {
        match store.list_all().await {
            Ok(rows) => {
                for row in rows {
                    info!(
                        id = row.id,
                        key_id = %row.key_id,
                        payload = %row.payload,
                        "Row"
                    );
                }
            }
            Err(e) => error!(error = %e, "Table scan failed"),
        }
    }

    info!("Done");
    Ok(())
}

/// Insert a row, logging instead of failing when the store is down
async fn persist(store: Option<&CiphertextStore>, key_id: &str, ciphertext: &str) {
    let Some(store) = store else {
        return;
    };
    match store.insert(key_id, ciphertext).await {
        Ok(id) => info!(id = id, key_id = %key_id, "Ciphertext persisted"),
        Err(e) => error!(key_id = %key_id, error = %e, "Failed to persist ciphertext"),
    }
}
