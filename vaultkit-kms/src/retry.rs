//! Bounded fixed-interval retry for operations on a not-yet-available key
//!
//! Management and crypto operations are rejected while a key is in a
//! transitional lifecycle state (CREATING, ENABLING, ...). [`wait_for_key`]
//! keeps re-invoking the operation at a fixed interval until it succeeds or
//! the total elapsed bound is exceeded.
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
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Wait configuration for [`wait_for_key`]
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Fixed delay between attempts, in seconds
    pub delay_secs: u64,
    /// Total elapsed bound, in seconds
    pub timeout_secs: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            delay_secs: 10,
            timeout_secs: 120,
        }
    }
}

impl WaitConfig {
    pub fn new(delay_secs: u64, timeout_secs: u64) -> Self {
        Self {
            delay_secs,
            timeout_secs,
        }
    }
}

/// Whether an error means "the key is not in a usable state yet".
///
/// Only these are worth waiting out: the service's conflict responses for
/// transitional lifecycle states, plus transport-level transient failures.
/// Permanent failures (bad id, permission denied, malformed request) are
/// not; retrying them would spin for the full bound before reporting an
/// error the caller could have seen on the first attempt.
pub fn is_key_not_ready(error: &KmsError) -> bool {
    match error {
        KmsError::Api { status, code, .. } => {
            matches!(*status, 409 | 429 | 502 | 503)
                || code == "KeyNotReady"
                || code == "LifecycleStateConflict"
        }
        KmsError::Http(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}

/// Re-invoke `op` at a fixed interval until it succeeds or the elapsed
/// bound is exceeded.
///
/// The operation is always invoked at least once. The first success is
/// returned immediately. Once accumulated elapsed time reaches the bound,
/// fails with [`KmsError::Timeout`] naming `key_id`. Errors that
/// [`is_key_not_ready`] rejects as permanent propagate on the attempt that
/// produced them.
pub async fn wait_for_key<'a, T, F>(config: &WaitConfig, key_id: &str, mut op: F) -> KmsResult<T>
where
    F: FnMut() -> Pin<Box<dyn Future<Output = KmsResult<T>> + Send + 'a>>,
{
    let mut waited_secs: u64 = 0;

    loop {
        match op().await {
            Ok(result) => {
                if waited_secs > 0 {
                    debug!(
                        key_id = key_id,
                        waited_secs = waited_secs,
                        "Key became available"
                    );
                }
                return Ok(result);
            }
            Err(e) if is_key_not_ready(&e) => {
                info!(
                    key_id = key_id,
                    waited_secs = waited_secs,
                    error = %e,
                    "Waiting for key state to become available"
                );
                sleep(Duration::from_secs(config.delay_secs)).await;
                // A zero delay still consumes one time unit, so the bound
                // stays reachable no matter how the interval is tuned.
                waited_secs += config.delay_secs.max(1);
                if waited_secs >= config.timeout_secs {
                    return Err(KmsError::Timeout {
                        key_id: key_id.to_string(),
                        waited_secs,
                    });
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn not_ready() -> KmsError {
        KmsError::Api {
            status: 409,
            code: "KeyNotReady".to_string(),
            message: "key is creating".to_string(),
        }
    }

    fn not_found() -> KmsError {
        KmsError::Api {
            status: 404,
            code: "NotAuthorizedOrNotFound".to_string(),
            message: "no such key".to_string(),
        }
    }

    #[tokio::test]
    async fn test_invoked_at_least_once_with_zero_bound() {
        let config = WaitConfig::new(0, 0);
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: KmsResult<i32> = wait_for_key(&config, "key-1", || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(not_ready()) })
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(KmsError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_first_success_returns_immediately() {
        let config = WaitConfig::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = wait_for_key(&config, "key-1", || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(42) })
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_retries() {
        // Zero delay keeps the test fast
        let config = WaitConfig::new(0, 120);
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = wait_for_key(&config, "key-1", || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if n < 2 {
                    Err(not_ready())
                } else {
                    Ok("enabled")
                }
            })
        })
        .await;

        assert_eq!(result.unwrap(), "enabled");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out_at_bound() {
        // 10s interval against a 120s bound: exactly twelve attempts
        let config = WaitConfig::new(10, 120);
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        tokio::time::pause();
        let result: KmsResult<i32> = wait_for_key(&config, "key-slow", || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(not_ready()) })
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 12);
        match result {
            Err(KmsError::Timeout {
                key_id,
                waited_secs,
            }) => {
                assert_eq!(key_id, "key-slow");
                assert_eq!(waited_secs, 120);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_delay_still_times_out() {
        // A zero-interval config must still hit the bound instead of
        // retrying forever: each attempt consumes one time unit.
        let config = WaitConfig::new(0, 120);
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: KmsResult<i32> = wait_for_key(&config, "key-stuck", || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(not_ready()) })
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 120);
        match result {
            Err(KmsError::Timeout {
                key_id,
                waited_secs,
            }) => {
                assert_eq!(key_id, "key-stuck");
                assert_eq!(waited_secs, 120);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let config = WaitConfig::new(0, 120);
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: KmsResult<i32> = wait_for_key(&config, "key-missing", || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(not_found()) })
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(KmsError::Api { status: 404, .. })));
    }

    #[test]
    fn test_is_key_not_ready() {
        assert!(is_key_not_ready(&not_ready()));
        assert!(is_key_not_ready(&KmsError::Api {
            status: 503,
            code: "ServiceUnavailable".to_string(),
            message: "try again".to_string(),
        }));

        assert!(!is_key_not_ready(&not_found()));
        assert!(!is_key_not_ready(&KmsError::Api {
            status: 401,
            code: "NotAuthenticated".to_string(),
            message: "bad token".to_string(),
        }));
        assert!(!is_key_not_ready(&KmsError::Credentials("no file".to_string())));
    }
}
