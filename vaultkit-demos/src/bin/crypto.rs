//! Crypto-plane demo
//!
//! Creates a key, round-trips a payload through the encrypt and decrypt
//! endpoints, then generates a data-encryption key and uses it for local
//! envelope encryption.
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
use vaultkit_demos::{DemoArgs, DemoContext, SAMPLE_PAYLOAD};
use vaultkit_kms::{envelope, wait_for_key, CreateKeyDetails};
use vaultkit_logging::init_console_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Argument validation happens before any network call
    let args = DemoArgs::parse();

    init_console_logging("crypto", "info");
    let ctx = DemoContext::connect(&args).await?;

    info!("======== CreateKey ========");
    let details = CreateKeyDetails::new(&args.compartment_id, "VAULTKIT_DEMO_CRYPTO");
    let key = ctx.management.create_key(&details).await?;
    let key_id = key.id.clone();

    info!("======== Encrypt ========");
    let ciphertext = wait_for_key(&ctx.wait, &key_id, || {
        Box::pin(ctx.crypto.encrypt_string(&key_id, SAMPLE_PAYLOAD))
    })
    .await?;
    info!(plaintext = SAMPLE_PAYLOAD, ciphertext = %ciphertext, "Encrypted");

    info!("======== Decrypt ========");
    let decrypted = wait_for_key(&ctx.wait, &key_id, || {
        Box::pin(ctx.crypto.decrypt_string(&key_id, &ciphertext))
    })
    .await?;
    info!(plaintext = %decrypted, "Decrypted");
    anyhow::ensure!(
        decrypted == SAMPLE_PAYLOAD,
        "Decrypted payload does not match the original"
    );

    info!("======== GenerateDataEncryptionKey ========");
    let (data_key, wrapped_key) = wait_for_key(&ctx.wait, &key_id, || {
        Box::pin(ctx.crypto.generate_aes_data_key(&key_id))
    })
    .await?;
    info!(wrapped_key = %wrapped_key, "Data-encryption key generated");

    info!("======== Envelope seal/open ========");
    let sealed = envelope::seal(&data_key, &wrapped_key, SAMPLE_PAYLOAD.as_bytes())?;
    info!(ciphertext = %sealed.ciphertext, "Payload sealed locally under the data key");

    let opened = envelope::open(&data_key, &sealed.ciphertext)?;
    anyhow::ensure!(
        opened == SAMPLE_PAYLOAD.as_bytes(),
        "Envelope round trip did not reproduce the payload"
    );
    info!("Envelope round trip verified");

    info!("Done");
    Ok(())
}
