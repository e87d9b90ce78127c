//! Key lifecycle demo
//!
//! Exercises the management plane end to end: create, get, update, list,
//! disable, enable, schedule/cancel deletion, rotate, list versions.
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
use vaultkit_demos::{demo_freeform_tags, DemoArgs, DemoContext};
use vaultkit_kms::{
    wait_for_key, CreateKeyDetails, ScheduleKeyDeletionDetails, UpdateKeyDetails,
};
use vaultkit_logging::init_console_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Argument validation happens before any network call
    let args = DemoArgs::parse();

    init_console_logging("key-lifecycle", "info");
    let ctx = DemoContext::connect(&args).await?;

    info!("======== CreateKey ========");
    let details = CreateKeyDetails::new(&args.compartment_id, "VAULTKIT_DEMO_LIFECYCLE")
        .with_freeform_tags(demo_freeform_tags());
    let key = ctx.management.create_key(&details).await?;
    let key_id = key.id.clone();

    info!("======== GetKey ========");
    let fetched = ctx.management.get_key(&key_id).await?;
    info!(
        key_id = %fetched.id,
        lifecycle_state = ?fetched.lifecycle_state,
        "Key retrieved"
    );

    info!("======== UpdateKey (reset tags) ========");
    let reset = UpdateKeyDetails {
        display_name: Some("VAULTKIT_DEMO_LIFECYCLE_V2".to_string()),
        freeform_tags: Some(HashMap::new()),
    };
    wait_for_key(&ctx.wait, &key_id, || {
        Box::pin(ctx.management.update_key(&key_id, &reset))
    })
    .await?;

    info!("======== UpdateKey ========");
    let mut tags = demo_freeform_tags();
    tags.insert("revision".to_string(), "2".to_string());
    let update = UpdateKeyDetails {
        display_name: Some("VAULTKIT_DEMO_LIFECYCLE_V2".to_string()),
        freeform_tags: Some(tags),
    };
    wait_for_key(&ctx.wait, &key_id, || {
        Box::pin(ctx.management.update_key(&key_id, &update))
    })
    .await?;

    info!("======== ListKeys ========");
    let keys = ctx.management.list_keys(&args.compartment_id).await?;
    for summary in &keys {
        info!(
            key_id = %summary.id,
            display_name = %summary.display_name,
            lifecycle_state = ?summary.lifecycle_state,
            "Key"
        );
    }

    info!("======== DisableKey ========");
    wait_for_key(&ctx.wait, &key_id, || {
        Box::pin(ctx.management.disable_key(&key_id))
    })
    .await?;

    info!("======== EnableKey ========");
    wait_for_key(&ctx.wait, &key_id, || {
        Box::pin(ctx.management.enable_key(&key_id))
    })
    .await?;

    info!("======== ScheduleKeyDeletion ========");
    let deletion = ScheduleKeyDeletionDetails::default();
    wait_for_key(&ctx.wait, &key_id, || {
        Box::pin(ctx.management.schedule_key_deletion(&key_id, &deletion))
    })
    .await?;

    info!("======== CancelKeyDeletion ========");
    wait_for_key(&ctx.wait, &key_id, || {
        Box::pin(ctx.management.cancel_key_deletion(&key_id))
    })
    .await?;

    info!("======== CreateKeyVersion (rotate) ========");
    let version = wait_for_key(&ctx.wait, &key_id, || {
        Box::pin(ctx.management.create_key_version(&key_id))
    })
    .await?;
    info!(key_version_id = %version.id, "New key version created");

    info!("======== ListKeyVersions ========");
    let versions = ctx.management.list_key_versions(&key_id).await?;
    for summary in &versions {
        info!(
            key_version_id = %summary.id,
            lifecycle_state = ?summary.lifecycle_state,
            time_created = ?summary.time_created,
            "Key version"
        );
    }

    info!("Done");
    Ok(())
}
