//! Shared HTTP plumbing for the three API clients
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
use crate::models::ApiErrorBody;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Build the reqwest client shared by an API client instance
pub(crate) fn build_http_client(timeout_seconds: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .expect("Failed to create HTTP client")
}

/// Map a non-success response body to a typed API error
pub(crate) fn api_error(status: u16, body: &str) -> KmsError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => KmsError::Api {
            status,
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => KmsError::Api {
            status,
            code: "Unknown".to_string(),
            message: body.trim().to_string(),
        },
    }
}

/// Shared request executor: bearer auth, JSON body, status check, JSON parse
pub(crate) struct ApiTransport {
    client: reqwest::Client,
    token: String,
}

impl ApiTransport {
    pub(crate) fn new(token: &str, timeout_seconds: u64) -> Self {
        Self {
            client: build_http_client(timeout_seconds),
            token: token.to_string(),
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: &str) -> KmsResult<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> KmsResult<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> KmsResult<T> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// POST with no request body (the lifecycle action endpoints)
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, url: &str) -> KmsResult<T> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> KmsResult<T> {
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> KmsResult<T> {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(KmsError::from);
        }
        let body = response.text().await.unwrap_or_default();
        Err(api_error(status.as_u16(), &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_service_body() {
        let err = api_error(409, r#"{"code":"KeyNotReady","message":"key is creating"}"#);
        match err {
            KmsError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code, "KeyNotReady");
                assert_eq!(message, "key is creating");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_from_opaque_body() {
        let err = api_error(502, "Bad Gateway\n");
        match err {
            KmsError::Api { status, code, message } => {
                assert_eq!(status, 502);
                assert_eq!(code, "Unknown");
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
