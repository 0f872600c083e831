use crate::error::RemoteError;
use crate::model::{AssetRecord, DispatchVehicle};

/// Read/write surface of the dispatch system.
pub trait DispatchApi {
    /// Full vehicle status list.
    fn fetch_vehicles(&mut self) -> Result<Vec<DispatchVehicle>, RemoteError>;

    /// Push an FMS status (and note) onto one vehicle.
    fn set_vehicle_status(
        &mut self,
        vehicle_id: i64,
        fms_status: i64,
        note: &str,
    ) -> Result<(), RemoteError>;
}

/// Read/write surface of the asset-tracking system.
pub trait AssetApi {
    /// Full asset list. Implementations cache the list for the duration
    /// of one reconciliation pass.
    fn fetch_assets(&mut self) -> Result<Vec<AssetRecord>, RemoteError>;

    /// Push a status and comment onto one asset. The remote requires a
    /// full payload, so implementations read-merge-write.
    fn update_asset(
        &mut self,
        asset_id: i64,
        status: &str,
        comment: &str,
    ) -> Result<(), RemoteError>;

    /// Drop any pass-scoped cache so the next fetch hits the remote.
    fn reset_cache(&mut self);
}
