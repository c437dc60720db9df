use crate::api_client::HttpPredictionApi;
use crate::config::ControllerSettings;
use anyhow::{anyhow, Result};
use log::info;

pub async fn run(settings: &ControllerSettings) -> Result<()> {
    let api = HttpPredictionApi::from_settings(settings)?;
    info!("Checking prediction API health at {}", api.base_url());
    let status = api.health().await?;
    if !status.is_ok() {
        return Err(anyhow!(
            "prediction API at {} reported status {}",
            api.base_url(),
            status.status
        ));
    }
    info!("Prediction API at {} is healthy", api.base_url());
    Ok(())
}
