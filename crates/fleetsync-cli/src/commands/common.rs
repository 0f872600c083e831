//! Shared wiring for the subcommands.

use fleetsync_core::{
    AssetClient, Config, Database, DispatchClient, ReconciliationEngine,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_database() -> Result<Database, Box<dyn std::error::Error>> {
    Ok(Database::open()?)
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    config.validate()?;
    Ok(config)
}

/// Build the production engine over the reqwest clients.
pub fn build_engine<'a>(
    db: &'a Database,
    config: &Config,
) -> Result<ReconciliationEngine<'a, DispatchClient, AssetClient>, Box<dyn std::error::Error>> {
    let dispatch = DispatchClient::new(&config.dispatch.base_url, &config.dispatch.access_key);
    let asset = AssetClient::new(&config.asset.base_url, config.asset.bu_id, &config.asset.api_key);
    Ok(ReconciliationEngine::new(db, dispatch, asset)?)
}
