//! Ciphertext storage in Postgres
//!
//! Rows of (generated id, key id, base64 ciphertext payload). The table is
//! created on connect if it does not exist; a pre-created compatible table
//! is left untouched.
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
use tokio_postgres::{Client, NoTls};
use tracing::{error, info};

/// One stored ciphertext row
#[derive(Debug, Clone)]
pub struct CiphertextRow {
    pub id: i64,
    pub key_id: String,
    /// Base64 ciphertext as returned by the KMS encrypt operation
    pub payload: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Postgres-backed ciphertext store
pub struct CiphertextStore {
    client: Client,
    table_name: String,
}

impl CiphertextStore {
    /// Connect to Postgres and ensure the table exists
    pub async fn connect(database_url: &str, table_name: &str) -> Result<Self> {
        validate_table_name(table_name)?;

        info!(table = table_name, "Connecting to ciphertext store");

        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

        // Spawn connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "Database connection error");
            }
        });

        let store = Self {
            client,
            table_name: table_name.to_string(),
        };
        store.run_migrations().await?;

        info!(table = table_name, "Ciphertext store connected and initialized");

        Ok(store)
    }

    /// Idempotent schema setup
    async fn run_migrations(&self) -> Result<()> {
        self.client
            .execute(
                &format!(
                    r#"
                    CREATE TABLE IF NOT EXISTS {} (
                        id BIGSERIAL PRIMARY KEY,
                        key_id TEXT NOT NULL,
                        payload TEXT NOT NULL,
                        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                    )
                    "#,
                    self.table_name
                ),
                &[],
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create {} table: {}", self.table_name, e))?;

        // Index on key_id for lookups by key
        self.client
            .execute(
                &format!(
                    r#"
                    CREATE INDEX IF NOT EXISTS idx_{table}_key_id
                    ON {table}(key_id)
                    "#,
                    table = self.table_name
                ),
                &[],
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create index: {}", e))?;

        Ok(())
    }

    /// Insert a ciphertext row, returning its generated id
    pub async fn insert(&self, key_id: &str, payload: &str) -> Result<i64> {
        let row = self
            .client
            .query_one(
                &format!(
                    r#"
                    INSERT INTO {} (key_id, payload)
                    VALUES ($1, $2)
                    RETURNING id
                    "#,
                    self.table_name
                ),
                &[&key_id, &payload],
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to insert ciphertext row: {}", e))?;

        let id: i64 = row.get(0);
        info!(id = id, key_id = key_id, "Ciphertext row stored");
        Ok(id)
    }

    /// Fetch all rows encrypted under a given key
    pub async fn find_by_key(&self, key_id: &str) -> Result<Vec<CiphertextRow>> {
        let rows = self
            .client
            .query(
                &format!(
                    r#"
                    SELECT id, key_id, payload, created_at
                    FROM {}
                    WHERE key_id = $1
                    ORDER BY id
                    "#,
                    self.table_name
                ),
                &[&key_id],
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to query ciphertext rows: {}", e))?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// Full table scan, ordered by id
    pub async fn list_all(&self) -> Result<Vec<CiphertextRow>> {
        let rows = self
            .client
            .query(
                &format!(
                    r#"
                    SELECT id, key_id, payload, created_at
                    FROM {}
                    ORDER BY id
                    "#,
                    self.table_name
                ),
                &[],
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to scan ciphertext table: {}", e))?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }
}

fn row_to_record(row: tokio_postgres::Row) -> CiphertextRow {
    CiphertextRow {
        id: row.get(0),
        key_id: row.get(1),
        payload: row.get(2),
        created_at: row.get(3),
    }
}

/// The table name is interpolated into DDL/DML text, so restrict it to a
/// plain identifier.
fn validate_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        anyhow::bail!("Invalid table name: {:?}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table_names() {
        assert!(validate_table_name("encrypted_payloads").is_ok());
        assert!(validate_table_name("encrypteddatademo").is_ok());
        assert!(validate_table_name("_t1").is_ok());
    }

    #[test]
    fn test_invalid_table_names() {
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1table").is_err());
        assert!(validate_table_name("t; DROP TABLE x").is_err());
        assert!(validate_table_name("t-name").is_err());
    }
}
