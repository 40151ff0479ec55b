//! Shared helpers for tests against a mock Atlas API

#![allow(dead_code)]

use mockito::{Matcher, Mock, Server, ServerGuard};
use mongodbatlas::adapters::atlas::AtlasClient;
use mongodbatlas::config::{secret_string, AtlasConnectionConfig, RetryConfig};
use mongodbatlas::core::poll::PollSettings;
use mongodbatlas::provider::Provider;
use std::sync::Arc;

pub const PROJECT_ID: &str = "5d0f1f73cf09a29120e173cf";
pub const CLUSTER_NAME: &str = "Cluster0";

/// A fresh mock server and a provider talking to it
///
/// Every test builds its own fixture so no state leaks between tests.
pub struct AtlasFixture {
    pub server: ServerGuard,
    pub provider: Provider,
}

impl AtlasFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;

        let config = AtlasConnectionConfig {
            base_url: server.url(),
            public_key: Some("abcdefgh".to_string()),
            private_key: Some(secret_string("11111111-2222-3333-4444-555555555555".to_string())),
            timeout_seconds: 5,
            retry: RetryConfig {
                max_retries: 0,
                ..Default::default()
            },
            ..Default::default()
        };

        let client = AtlasClient::new(&config).expect("client");
        let provider = Provider::with_api(Arc::new(client), PollSettings::immediate());

        Self { server, provider }
    }

    /// Path of an Admin API v1.0 endpoint
    pub fn path(segments: &str) -> String {
        format!("/api/atlas/v1.0/{segments}")
    }

    /// Mocks a JSON answer that is expected exactly `hits` times
    pub async fn json(&mut self, method: &str, path: &str, status: usize, body: &str, hits: usize) -> Mock {
        self.server
            .mock(method, Self::path(path).as_str())
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Mocks a JSON answer served only when the request body matches `request`
    pub async fn json_for_body(
        &mut self,
        method: &str,
        path: &str,
        request: Matcher,
        status: usize,
        body: &str,
        hits: usize,
    ) -> Mock {
        self.server
            .mock(method, Self::path(path).as_str())
            .match_body(request)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Mocks an Atlas error answer
    pub async fn error(&mut self, method: &str, path: &str, status: usize, code: &str, hits: usize) -> Mock {
        let body = format!(
            r#"{{"error": {status}, "errorCode": "{code}", "detail": "mocked {code}", "reason": "mocked"}}"#
        );
        self.json(method, path, status, &body, hits).await
    }
}
