//! Joining the two systems' vehicle lists into matched pairs.

use std::collections::BTreeMap;

use crate::model::{AssetRecord, DispatchVehicle, MatchedPair};

/// Asset-system groups that hold vehicles. Other groups carry rooms,
/// equipment and personnel records and are never synced.
pub const VEHICLE_GROUP_IDS: [i64; 2] = [1, 5];

/// Join both vehicle lists on the shared name/number key.
///
/// Asset records outside the vehicle groups and records with an empty
/// join key are skipped. Unmatched vehicles do not appear in the output.
/// Duplicate join keys keep the first-seen record on either side --
/// documented policy, not an error.
pub fn match_vehicles(
    dispatch: &[DispatchVehicle],
    assets: &[AssetRecord],
) -> BTreeMap<String, MatchedPair> {
    let mut assets_by_name: BTreeMap<&str, &AssetRecord> = BTreeMap::new();
    for asset in assets {
        if !VEHICLE_GROUP_IDS.contains(&asset.group_id) || asset.name.is_empty() {
            continue;
        }
        assets_by_name.entry(asset.name.as_str()).or_insert(asset);
    }

    let mut pairs = BTreeMap::new();
    for vehicle in dispatch {
        if vehicle.number.is_empty() {
            continue;
        }
        let Some(asset) = assets_by_name.get(vehicle.number.as_str()) else {
            continue;
        };
        pairs.entry(vehicle.number.clone()).or_insert_with(|| MatchedPair {
            dispatch: vehicle.clone(),
            asset: (*asset).clone(),
        });
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(id: i64, number: &str) -> DispatchVehicle {
        DispatchVehicle {
            id,
            name: format!("Vehicle {number}"),
            number: number.to_string(),
            fms_status: 2,
            fms_note: String::new(),
            fms_ts: 0,
        }
    }

    fn asset(id: i64, name: &str, group_id: i64) -> AssetRecord {
        AssetRecord {
            id,
            name: name.to_string(),
            group_id,
            status: "ready".to_string(),
            comment: None,
            last_modified: "2024-01-01T00:00:00".to_string(),
        }
    }

    #[test]
    fn matches_on_join_key() {
        let pairs = match_vehicles(
            &[dispatch(1, "FL-1-44"), dispatch(2, "FL-1-46")],
            &[asset(10, "FL-1-44", 1), asset(11, "FL-1-46", 5)],
        );
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs["FL-1-44"].asset.id, 10);
        assert_eq!(pairs["FL-1-46"].dispatch.id, 2);
    }

    #[test]
    fn unmatched_vehicles_are_invisible() {
        let pairs = match_vehicles(
            &[dispatch(1, "FL-1-44"), dispatch(2, "only-dispatch")],
            &[asset(10, "FL-1-44", 1), asset(11, "only-asset", 1)],
        );
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains_key("FL-1-44"));
    }

    #[test]
    fn non_vehicle_groups_are_filtered() {
        let pairs = match_vehicles(
            &[dispatch(1, "FL-1-44")],
            &[asset(10, "FL-1-44", 3)],
        );
        assert!(pairs.is_empty());
    }

    #[test]
    fn empty_join_keys_are_skipped() {
        let pairs = match_vehicles(
            &[dispatch(1, "")],
            &[asset(10, "", 1)],
        );
        assert!(pairs.is_empty());
    }

    #[test]
    fn duplicate_keys_keep_first_seen() {
        let mut second = asset(11, "FL-1-44", 1);
        second.status = "notready".to_string();
        let pairs = match_vehicles(
            &[dispatch(1, "FL-1-44"), dispatch(2, "FL-1-44")],
            &[asset(10, "FL-1-44", 1), second],
        );
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs["FL-1-44"].asset.id, 10);
        assert_eq!(pairs["FL-1-44"].dispatch.id, 1);
    }
}
