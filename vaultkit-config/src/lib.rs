//! Configuration management for vaultkit binaries
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


use serde::Deserialize;
use std::env;

/// KMS API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KmsApiConfig {
    /// Path to the credentials profile file
    pub profile_path: Option<String>,
    /// Profile name within the credentials file
    pub profile_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub table_name: Option<String>,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub kms: KmsApiConfig,
    pub database: Option<DatabaseConfig>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let profile_path = env::var("VAULTKIT_PROFILE_PATH").ok();

        let profile_name = env::var("VAULTKIT_PROFILE")
            .unwrap_or_else(|_| "DEFAULT".to_string());

        let timeout_seconds = env::var("VAULTKIT_API_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string());

        // Build database config only if a URL is present
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            table_name: env::var("DATABASE_TABLE").ok(),
        });

        Ok(Self {
            kms: KmsApiConfig {
                profile_path,
                profile_name,
                timeout_seconds,
            },
            database,
            log_level: Some(log_level),
        })
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Get the ciphertext table name, defaulting to "encrypted_payloads"
    pub fn table_name(&self) -> &str {
        self.database
            .as_ref()
            .and_then(|db| db.table_name.as_deref())
            .unwrap_or("encrypted_payloads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig {
            kms: KmsApiConfig {
                profile_path: None,
                profile_name: "DEFAULT".to_string(),
                timeout_seconds: 30,
            },
            database: None,
            log_level: None,
        };

        assert_eq!(config.log_level(), "info");
        assert_eq!(config.table_name(), "encrypted_payloads");
    }

    #[test]
    fn test_table_name_override() {
        let config = AppConfig {
            kms: KmsApiConfig {
                profile_path: None,
                profile_name: "DEFAULT".to_string(),
                timeout_seconds: 30,
            },
            database: Some(DatabaseConfig {
                url: "postgres://localhost:5432/kms".to_string(),
                table_name: Some("encrypteddatademo".to_string()),
            }),
            log_level: Some("debug".to_string()),
        };

        assert_eq!(config.table_name(), "encrypteddatademo");
        assert_eq!(config.log_level(), "debug");
    }
}
