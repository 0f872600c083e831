//! HTTP client for the asset-tracking system.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::json;

use crate::error::{RemoteError, SystemKind};
use crate::model::AssetRecord;

use super::rate_limit::RateLimiter;
use super::traits::AssetApi;

/// Minimum spacing between outbound calls to the asset system. The
/// remote rate-limits aggressively; the dispatch side has no such
/// constraint, so this stays per-system.
pub const ASSET_MIN_CALL_SPACING: Duration = Duration::from_secs(3);

/// Asset API client with bearer-token auth, a pass-scoped asset cache
/// and a blocking rate limiter.
///
/// The cache holds the raw JSON records: the remote's PATCH endpoint
/// requires a full payload, so updates merge into the raw record to
/// preserve fields this crate does not model.
pub struct AssetClient {
    http: Client,
    base_url: String,
    bu_id: i64,
    api_key: String,
    limiter: RateLimiter,
    cache: Option<Vec<serde_json::Value>>,
}

impl AssetClient {
    pub fn new(base_url: impl Into<String>, bu_id: i64, api_key: impl Into<String>) -> Self {
        Self::with_min_spacing(base_url, bu_id, api_key, ASSET_MIN_CALL_SPACING)
    }

    /// Construct with an explicit call spacing (tests use zero).
    pub fn with_min_spacing(
        base_url: impl Into<String>,
        bu_id: i64,
        api_key: impl Into<String>,
        min_spacing: Duration,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bu_id,
            api_key: api_key.into(),
            limiter: RateLimiter::new(min_spacing),
            cache: None,
        }
    }

    fn send(&mut self, request: RequestBuilder) -> Result<serde_json::Value, RemoteError> {
        self.limiter.wait();
        let response = request
            .header("User-Agent", "fleetsync")
            .header("Accept", "application/json")
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|source| RemoteError::Transport {
                system: SystemKind::Asset,
                source,
            })?;
        Self::check(response)
    }

    fn check(response: Response) -> Result<serde_json::Value, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RemoteError::Status {
                system: SystemKind::Asset,
                status: status.as_u16(),
                body,
            });
        }
        response.json().map_err(|source| RemoteError::Transport {
            system: SystemKind::Asset,
            source,
        })
    }

    /// Raw asset records, fetched once per pass.
    fn raw_assets(&mut self) -> Result<&[serde_json::Value], RemoteError> {
        if self.cache.is_none() {
            let url = format!("{}/assets/?buIds={}", self.base_url, self.bu_id);
            let payload = self.send(self.http.get(url))?;
            let records = payload
                .as_array()
                .cloned()
                .ok_or_else(|| RemoteError::Payload {
                    system: SystemKind::Asset,
                    message: "expected a top-level array of assets".to_string(),
                })?;
            self.cache = Some(records);
        }
        Ok(self.cache.as_deref().unwrap_or_default())
    }
}

impl AssetApi for AssetClient {
    fn fetch_assets(&mut self) -> Result<Vec<AssetRecord>, RemoteError> {
        let mut assets = Vec::new();
        for raw in self.raw_assets()? {
            // Records without the modeled fields (rooms, equipment from
            // other modules) are dropped at the adapter boundary.
            match serde_json::from_value::<AssetRecord>(raw.clone()) {
                Ok(asset) => assets.push(asset),
                Err(e) => tracing::debug!("skipping unparseable asset record: {e}"),
            }
        }
        Ok(assets)
    }

    fn update_asset(
        &mut self,
        asset_id: i64,
        status: &str,
        comment: &str,
    ) -> Result<(), RemoteError> {
        let mut payload = self
            .raw_assets()?
            .iter()
            .find(|raw| raw.get("id").and_then(serde_json::Value::as_i64) == Some(asset_id))
            .cloned()
            .ok_or(RemoteError::AssetMissing { id: asset_id })?;

        payload["status"] = json!(status);
        payload["comment"] = json!(comment);

        let url = format!("{}/assets/{asset_id}?notifyRadio=false", self.base_url);
        self.send(self.http.patch(url).json(&payload)).map(|_| ())
    }

    fn reset_cache(&mut self) {
        self.cache = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::Server) -> AssetClient {
        AssetClient::with_min_spacing(server.url(), 7, "token", Duration::ZERO)
    }

    const ASSET_LIST: &str = r#"[
        {"id": 10, "name": "FL-1-44", "groupId": 1, "status": "ready",
         "comment": "fueled", "lastModified": "2024-03-01T12:00:00",
         "radioName": "florian 1/44"},
        {"id": 99, "name": "Meeting Room", "groupId": 3, "status": "ready",
         "lastModified": "2024-03-01T12:00:00"},
        {"id": 11, "groupId": 1}
    ]"#;

    #[test]
    fn fetch_assets_is_cached_per_pass() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/assets/")
            .match_query(mockito::Matcher::UrlEncoded("buIds".into(), "7".into()))
            .with_status(200)
            .with_body(ASSET_LIST)
            .expect(2)
            .create();

        let mut client = client(&server);
        let first = client.fetch_assets().unwrap();
        let second = client.fetch_assets().unwrap();
        // Malformed record 11 is dropped; the room stays (the matcher
        // filters groups, not the client).
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);

        client.reset_cache();
        client.fetch_assets().unwrap();
        mock.assert();
    }

    #[test]
    fn update_asset_merges_into_full_payload() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/assets/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(ASSET_LIST)
            .create();
        let patch = server
            .mock("PATCH", "/assets/10")
            .match_query(mockito::Matcher::UrlEncoded(
                "notifyRadio".into(),
                "false".into(),
            ))
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "id": 10,
                "status": "notready",
                "comment": "pump defect",
                "radioName": "florian 1/44"
            })))
            .with_status(200)
            .with_body("{}")
            .create();

        let mut client = client(&server);
        client.update_asset(10, "notready", "pump defect").unwrap();
        patch.assert();
    }

    #[test]
    fn update_unknown_asset_fails_without_a_write() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/assets/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create();

        let mut client = client(&server);
        let err = client.update_asset(123, "ready", "").unwrap_err();
        assert!(matches!(err, RemoteError::AssetMissing { id: 123 }));
    }

    #[test]
    fn non_success_carries_status_and_body() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/assets/")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_body("slow down")
            .create();

        let mut client = client(&server);
        let err = client.fetch_assets().unwrap_err();
        match err {
            RemoteError::Status { system, status, body } => {
                assert_eq!(system, SystemKind::Asset);
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
