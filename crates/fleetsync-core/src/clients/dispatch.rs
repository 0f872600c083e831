//! HTTP client for the dispatch system.

use reqwest::blocking::{Client, Response};
use serde_json::json;

use crate::error::{RemoteError, SystemKind};
use crate::model::DispatchVehicle;

use super::traits::DispatchApi;

/// Dispatch API client. Authenticates with an access key passed as a
/// query parameter; no rate limit on this side.
pub struct DispatchClient {
    http: Client,
    base_url: String,
    access_key: String,
}

impl DispatchClient {
    pub fn new(base_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_key: access_key.into(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}/{endpoint}{separator}accesskey={}",
            self.base_url, self.access_key
        )
    }

    fn check(response: Response) -> Result<serde_json::Value, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RemoteError::Status {
                system: SystemKind::Dispatch,
                status: status.as_u16(),
                body,
            });
        }
        response.json().map_err(|source| RemoteError::Transport {
            system: SystemKind::Dispatch,
            source,
        })
    }
}

impl DispatchApi for DispatchClient {
    fn fetch_vehicles(&mut self) -> Result<Vec<DispatchVehicle>, RemoteError> {
        let response = self
            .http
            .get(self.url("pull/vehicle-status"))
            .send()
            .map_err(|source| RemoteError::Transport {
                system: SystemKind::Dispatch,
                source,
            })?;
        let payload = Self::check(response)?;

        // Missing `data` means an empty fleet, not an error.
        let data = payload
            .get("data")
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));
        serde_json::from_value(data).map_err(|e| RemoteError::Payload {
            system: SystemKind::Dispatch,
            message: e.to_string(),
        })
    }

    fn set_vehicle_status(
        &mut self,
        vehicle_id: i64,
        fms_status: i64,
        note: &str,
    ) -> Result<(), RemoteError> {
        let mut payload = json!({
            "status": fms_status,
            "status_id": fms_status,
        });
        if !note.is_empty() {
            // The status note field is single-line on the remote.
            payload["status_note"] = json!(note.replace('\n', " "));
        }

        let response = self
            .http
            .post(self.url(&format!("using-vehicles/set-status/{vehicle_id}")))
            .json(&payload)
            .send()
            .map_err(|source| RemoteError::Transport {
                system: SystemKind::Dispatch,
                source,
            })?;
        Self::check(response).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_vehicles_parses_data_array() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/pull/vehicle-status")
            .match_query(mockito::Matcher::UrlEncoded(
                "accesskey".into(),
                "secret".into(),
            ))
            .with_status(200)
            .with_body(
                r#"{"data": [
                    {"id": 42, "name": "LF 20", "number": "FL-1-44",
                     "fmsstatus": 2, "fmsstatus_note": "at station",
                     "fmsstatus_ts": 1700000000}
                ]}"#,
            )
            .create();

        let mut client = DispatchClient::new(server.url(), "secret");
        let vehicles = client.fetch_vehicles().unwrap();
        mock.assert();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].number, "FL-1-44");
        assert_eq!(vehicles[0].fms_status, 2);
    }

    #[test]
    fn fetch_vehicles_tolerates_missing_data() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/pull/vehicle-status")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create();

        let mut client = DispatchClient::new(server.url(), "secret");
        assert!(client.fetch_vehicles().unwrap().is_empty());
    }

    #[test]
    fn set_vehicle_status_flattens_newlines_and_skips_empty_note() {
        let mut server = mockito::Server::new();
        let with_note = server
            .mock("POST", "/using-vehicles/set-status/42")
            .match_query(mockito::Matcher::Any)
            .match_body(mockito::Matcher::Json(json!({
                "status": 2,
                "status_id": 2,
                "status_note": "two lines"
            })))
            .with_status(200)
            .with_body("{}")
            .create();

        let mut client = DispatchClient::new(server.url(), "secret");
        client.set_vehicle_status(42, 2, "two\nlines").unwrap();
        with_note.assert();

        let without_note = server
            .mock("POST", "/using-vehicles/set-status/42")
            .match_query(mockito::Matcher::Any)
            .match_body(mockito::Matcher::Json(json!({
                "status": 6,
                "status_id": 6
            })))
            .with_status(200)
            .with_body("{}")
            .create();

        client.set_vehicle_status(42, 6, "").unwrap();
        without_note.assert();
    }

    #[test]
    fn non_success_carries_status_and_body() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/pull/vehicle-status")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .with_body("maintenance window")
            .create();

        let mut client = DispatchClient::new(server.url(), "secret");
        let err = client.fetch_vehicles().unwrap_err();
        match err {
            RemoteError::Status { system, status, body } => {
                assert_eq!(system, SystemKind::Dispatch);
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance window");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
