//! Typed records for both vehicle systems and the reconciliation outcome.
//!
//! External APIs hand back loosely shaped JSON; these structs declare the
//! required and optional fields up front, and serde drops unknown extras
//! at the adapter boundary.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Vehicle record from the dispatch system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchVehicle {
    pub id: i64,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub name: String,
    /// Radio call number -- the cross-system join key.
    #[serde(default, deserialize_with = "null_to_empty")]
    pub number: String,
    #[serde(rename = "fmsstatus")]
    pub fms_status: i64,
    #[serde(rename = "fmsstatus_note", default, deserialize_with = "null_to_empty")]
    pub fms_note: String,
    /// Epoch seconds of the last FMS status change.
    #[serde(rename = "fmsstatus_ts", default)]
    pub fms_ts: i64,
}

impl DispatchVehicle {
    /// Last-modified instant, normalized to UTC.
    pub fn last_modified(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.fms_ts, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Vehicle record from the asset-tracking system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "groupId")]
    pub group_id: i64,
    /// Status code in the asset vocabulary (see `vocabulary`).
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
    /// ISO-like last-modified string as reported by the remote.
    #[serde(rename = "lastModified", default)]
    pub last_modified: String,
}

impl AssetRecord {
    /// Missing comments compare as the empty string.
    pub fn comment_or_empty(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }

    /// Last-modified instant, normalized to UTC.
    pub fn last_modified_utc(&self) -> DateTime<Utc> {
        parse_asset_timestamp(&self.last_modified)
    }
}

/// Parse the asset system's ISO-like timestamps.
///
/// RFC 3339 when an offset is present; naive datetimes are taken as UTC.
/// Unparseable values fall back to the epoch, so a broken timestamp can
/// never claim to be the newer side.
pub fn parse_asset_timestamp(raw: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Utc.from_utc_datetime(&naive);
        }
    }
    DateTime::<Utc>::UNIX_EPOCH
}

/// One vehicle present in both systems under the same join key.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPair {
    pub dispatch: DispatchVehicle,
    pub asset: AssetRecord,
}

/// Requested mode for a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// The side with the strictly later timestamp wins per vehicle.
    #[default]
    Both,
    /// Force pushes toward the dispatch system.
    TowardDispatch,
    /// Force pushes toward the asset system.
    TowardAsset,
}

impl std::str::FromStr for SyncDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(SyncDirection::Both),
            "dispatch" | "toward-dispatch" => Ok(SyncDirection::TowardDispatch),
            "asset" | "toward-asset" => Ok(SyncDirection::TowardAsset),
            other => Err(format!(
                "unknown sync direction '{other}' (expected both, dispatch or asset)"
            )),
        }
    }
}

/// The direction actually chosen for a single vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeDirection {
    AssetToDispatch,
    DispatchToAsset,
}

impl OutcomeDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeDirection::AssetToDispatch => "asset_to_dispatch",
            OutcomeDirection::DispatchToAsset => "dispatch_to_asset",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asset_to_dispatch" => Some(OutcomeDirection::AssetToDispatch),
            "dispatch_to_asset" => Some(OutcomeDirection::DispatchToAsset),
            _ => None,
        }
    }
}

/// Durable record of a single vehicle's reconciliation decision and result.
///
/// Field names are the compatibility surface for anything reading the
/// audit trail and must round-trip through serialization without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    pub vehicle_name: String,
    pub dispatch_id: i64,
    pub asset_id: i64,
    /// None when the attempt failed before a direction was chosen.
    pub sync_direction: Option<OutcomeDirection>,
    pub fields_synced: Vec<String>,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Singleton aggregate of pass-level bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatusSnapshot {
    pub last_sync: Option<DateTime<Utc>>,
    pub last_sync_count: i64,
    pub total_syncs: i64,
    pub auto_sync_enabled: bool,
    pub sync_interval_secs: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

fn null_to_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dispatch_vehicle_from_api_payload() {
        let vehicle: DispatchVehicle = serde_json::from_value(json!({
            "id": 42,
            "name": "LF 20",
            "number": "FL-1-44",
            "fmsstatus": 2,
            "fmsstatus_note": null,
            "fmsstatus_ts": 1_700_000_000,
            "shortname": "dropped at the boundary"
        }))
        .unwrap();
        assert_eq!(vehicle.number, "FL-1-44");
        assert_eq!(vehicle.fms_note, "");
        assert_eq!(vehicle.last_modified().timestamp(), 1_700_000_000);
    }

    #[test]
    fn asset_timestamps_normalize_to_utc() {
        let with_offset = parse_asset_timestamp("2024-03-01T12:00:00+01:00");
        assert_eq!(with_offset.to_rfc3339(), "2024-03-01T11:00:00+00:00");

        let naive = parse_asset_timestamp("2024-03-01T11:00:00");
        assert_eq!(naive, with_offset);

        assert_eq!(parse_asset_timestamp("garbage"), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn outcome_direction_wire_strings() {
        assert_eq!(OutcomeDirection::AssetToDispatch.as_str(), "asset_to_dispatch");
        assert_eq!(
            OutcomeDirection::parse("dispatch_to_asset"),
            Some(OutcomeDirection::DispatchToAsset)
        );
        assert_eq!(OutcomeDirection::parse("sideways"), None);
    }

    #[test]
    fn sync_direction_from_str() {
        assert_eq!("both".parse::<SyncDirection>().unwrap(), SyncDirection::Both);
        assert_eq!(
            "dispatch".parse::<SyncDirection>().unwrap(),
            SyncDirection::TowardDispatch
        );
        assert_eq!(
            "toward-asset".parse::<SyncDirection>().unwrap(),
            SyncDirection::TowardAsset
        );
        assert!("upward".parse::<SyncDirection>().is_err());
    }

    #[test]
    fn outcome_serializes_with_compatibility_field_names() {
        let outcome = ReconciliationOutcome {
            vehicle_name: "FL-1-44".to_string(),
            dispatch_id: 42,
            asset_id: 7,
            sync_direction: Some(OutcomeDirection::AssetToDispatch),
            fields_synced: vec!["status".to_string(), "comment".to_string()],
            success: true,
            error_message: None,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["vehicle_name"], "FL-1-44");
        assert_eq!(value["sync_direction"], "asset_to_dispatch");
        assert_eq!(value["fields_synced"][0], "status");
        assert_eq!(value["success"], true);

        let back: ReconciliationOutcome = serde_json::from_value(value).unwrap();
        assert_eq!(back, outcome);
    }
}
