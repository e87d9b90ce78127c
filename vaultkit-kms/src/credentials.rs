//! Credentials profile file loading
//!
//! The demo binaries authenticate against the KMS service with an API token
//! read from an INI-style profile file, the same shape the managed SDK uses:
//!
//! ```ini
//! [DEFAULT]
//! token = <api token>
//! endpoint = https://kms.{region}.example-cloud.com
//! ```
//!
//! The `endpoint` value is a template; `{region}` is substituted with the
//! region passed on the command line. `VAULTKIT_API_TOKEN` and
//! `VAULTKIT_API_ENDPOINT` override the file when set.
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
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default location of the credentials profile file
pub const DEFAULT_PROFILE_PATH: &str = "~/.vaultkit/config";

/// Default profile name
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Credentials for the KMS API
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Bearer token sent on every request
    pub token: String,
    /// Control-plane endpoint template, e.g.
    /// `https://kms.{region}.example-cloud.com`
    pub endpoint: String,
}

impl Credentials {
    /// Load credentials from the profile file, honoring environment
    /// variable overrides.
    pub fn load(path: Option<&str>, profile: &str) -> KmsResult<Self> {
        let env_token = env::var("VAULTKIT_API_TOKEN").ok();
        let env_endpoint = env::var("VAULTKIT_API_ENDPOINT").ok();

        // Environment alone is enough; skip the file entirely in that case.
        if let (Some(token), Some(endpoint)) = (env_token.clone(), env_endpoint.clone()) {
            debug!("Using credentials from environment variables");
            return Ok(Self { token, endpoint });
        }

        let path = expand_home(path.unwrap_or(DEFAULT_PROFILE_PATH));
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            KmsError::Credentials(format!(
                "Cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        let section = parse_profile(&contents, profile).ok_or_else(|| {
            KmsError::Credentials(format!(
                "Profile [{}] not found in {}",
                profile,
                path.display()
            ))
        })?;

        let token = env_token
            .or_else(|| section.get("token").cloned())
            .ok_or_else(|| {
                KmsError::Credentials(format!("Profile [{}] is missing 'token'", profile))
            })?;

        let endpoint = env_endpoint
            .or_else(|| section.get("endpoint").cloned())
            .ok_or_else(|| {
                KmsError::Credentials(format!("Profile [{}] is missing 'endpoint'", profile))
            })?;

        Ok(Self { token, endpoint })
    }

    /// Resolve the control-plane endpoint for a region
    pub fn control_plane_endpoint(&self, region: &str) -> String {
        if !self.endpoint.contains("{region}") {
            warn!(
                endpoint = %self.endpoint,
                "Endpoint template has no {{region}} placeholder, using it as-is"
            );
        }
        self.endpoint.replace("{region}", region)
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = env::var("HOME") {
            return Path::new(&home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse one `[profile]` section of an INI-style file into a key/value map
fn parse_profile(contents: &str, profile: &str) -> Option<HashMap<String, String>> {
    let mut in_section = false;
    let mut found = false;
    let mut values = HashMap::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == profile;
            found |= in_section;
            continue;
        }
        if in_section {
            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    if found {
        Some(values)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# vaultkit credentials
[DEFAULT]
token = tok-default
endpoint = https://kms.{region}.example-cloud.com

[STAGING]
token = tok-staging
endpoint = https://kms-staging.{region}.example-cloud.com
";

    #[test]
    fn test_parse_default_profile() {
        let section = parse_profile(SAMPLE, "DEFAULT").unwrap();
        assert_eq!(section.get("token").unwrap(), "tok-default");
        assert_eq!(
            section.get("endpoint").unwrap(),
            "https://kms.{region}.example-cloud.com"
        );
    }

    #[test]
    fn test_parse_named_profile() {
        let section = parse_profile(SAMPLE, "STAGING").unwrap();
        assert_eq!(section.get("token").unwrap(), "tok-staging");
    }

    #[test]
    fn test_missing_profile() {
        assert!(parse_profile(SAMPLE, "PRODUCTION").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let creds =
            Credentials::load(Some(file.path().to_str().unwrap()), "STAGING").unwrap();
        assert_eq!(creds.token, "tok-staging");
        assert_eq!(
            creds.control_plane_endpoint("us-phoenix-1"),
            "https://kms-staging.us-phoenix-1.example-cloud.com"
        );
    }

    #[test]
    fn test_missing_token_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[DEFAULT]\nendpoint = https://kms.example\n")
            .unwrap();

        let err =
            Credentials::load(Some(file.path().to_str().unwrap()), "DEFAULT").unwrap_err();
        assert!(matches!(err, KmsError::Credentials(_)));
    }
}
