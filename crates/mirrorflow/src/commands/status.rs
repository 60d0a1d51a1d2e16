//! `mirrorflow status`: poll the provisioning state of every planned resource

use crate::config::DeploymentConfig;
use anyhow::Context;
use colored::Colorize;
use mirrorflow_cloud::{ResourceBackend, Sequencer};
use mirrorflow_cloud_azure::AzureNetAppBackend;

pub async fn handle(config: &DeploymentConfig) -> anyhow::Result<()> {
    let plan = config.to_plan()?;
    let backend = AzureNetAppBackend::from_env().context("loading Azure credentials")?;
    let sequencer = Sequencer::new(backend);
    let handles = sequencer.resolve_all(&plan)?;

    for handle in &handles {
        match sequencer.backend().provisioning_state(handle).await {
            Ok(state) => {
                println!("  {:<40} {}", handle.to_string(), state);
            }
            Err(e) if e.is_not_found() => {
                println!("  {:<40} {}", handle.to_string(), "absent".dimmed());
            }
            Err(e) => {
                println!("  {:<40} {} ({e})", handle.to_string(), "error".red());
            }
        }
    }
    Ok(())
}
