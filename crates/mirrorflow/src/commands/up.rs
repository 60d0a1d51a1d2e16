//! `mirrorflow up`: provision the deployment

use crate::config::DeploymentConfig;
use anyhow::Context;
use colored::Colorize;
use mirrorflow_cloud::Sequencer;
use mirrorflow_cloud_azure::AzureNetAppBackend;

pub async fn handle(config: &DeploymentConfig) -> anyhow::Result<()> {
    let plan = config.to_plan()?;
    println!("{} {}", "Provisioning:".bold(), plan.summary());

    let backend = AzureNetAppBackend::from_env().context("loading Azure credentials")?;
    let sequencer = Sequencer::new(backend);

    tracing::info!(plan = %plan.summary(), "starting provisioning");
    let handles = match sequencer.provision(&plan).await {
        Ok(handles) => handles,
        Err(e) => {
            // No rollback: everything created before the failure stays up
            for handle in e.completed() {
                eprintln!("  {} {} (left in place)", "!".yellow(), handle);
            }
            return Err(e.into());
        }
    };

    for handle in &handles {
        println!("  {} {}", "✓".green(), handle);
    }
    println!("{}", "Deployment ready.".green().bold());

    if config.cleanup {
        println!(
            "{}",
            "cleanup is enabled; tearing the deployment back down".yellow()
        );
        tracing::info!(resources = handles.len(), "starting cleanup teardown");
        sequencer.teardown_ordered(&handles).await?;
        println!("{}", "Teardown complete.".green());
    }

    Ok(())
}
