//! Status vocabulary translation between the two systems.
//!
//! The dispatch system reports FMS readiness codes (small integers); the
//! asset system uses lowercase status strings. The mapping is total over
//! the codes that occur in practice and fails loudly on anything else.
//!
//! Two lossy collapses are deliberate and must stay:
//! - FMS 3 and 4 are both in-use variants and map to the single asset
//!   status `inuse`; `inuse` maps back to 3, so FMS 4 does not round-trip.
//! - the asset status `maint` maps to FMS 6 (`notready`) and is therefore
//!   rewritten to `notready` on the way back.

use crate::error::VocabularyError;

/// Asset status codes with a defined FMS translation.
pub const ASSET_STATUSES: [&str; 5] = ["ready", "semiready", "notready", "inuse", "maint"];

/// Translate a dispatch FMS code into the asset status vocabulary.
pub fn to_asset(fms: i64) -> Result<&'static str, VocabularyError> {
    match fms {
        1 => Ok("semiready"),
        2 => Ok("ready"),
        3 | 4 => Ok("inuse"),
        6 => Ok("notready"),
        other => Err(VocabularyError::UnmappedFms(other)),
    }
}

/// Translate an asset status into the dispatch FMS code space.
pub fn to_dispatch(status: &str) -> Result<i64, VocabularyError> {
    match status {
        "ready" => Ok(2),
        "semiready" => Ok(1),
        "notready" => Ok(6),
        "inuse" => Ok(3),
        "maint" => Ok(6),
        other => Err(VocabularyError::UnmappedAsset(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_codes_round_trip_except_inuse_collapse() {
        for fms in [1, 2, 3, 6] {
            assert_eq!(to_dispatch(to_asset(fms).unwrap()).unwrap(), fms);
        }
        // FMS 4 collapses onto `inuse`, which maps back to 3.
        assert_eq!(to_asset(4).unwrap(), "inuse");
        assert_eq!(to_dispatch(to_asset(4).unwrap()).unwrap(), 3);
    }

    #[test]
    fn maint_is_lossy_toward_dispatch() {
        assert_eq!(to_dispatch("maint").unwrap(), 6);
        assert_eq!(to_asset(6).unwrap(), "notready");
    }

    #[test]
    fn every_listed_asset_status_is_mapped() {
        for status in ASSET_STATUSES {
            assert!(to_dispatch(status).is_ok(), "unmapped status {status}");
        }
    }

    #[test]
    fn unknown_codes_fail_loudly() {
        assert_eq!(to_asset(5), Err(VocabularyError::UnmappedFms(5)));
        assert_eq!(to_asset(0), Err(VocabularyError::UnmappedFms(0)));
        assert_eq!(
            to_dispatch("broken"),
            Err(VocabularyError::UnmappedAsset("broken".to_string()))
        );
    }
}
