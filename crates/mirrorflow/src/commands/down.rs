//! `mirrorflow down`: tear the deployment down in reverse creation order

use crate::config::DeploymentConfig;
use anyhow::Context;
use colored::Colorize;
use mirrorflow_cloud::Sequencer;
use mirrorflow_cloud_azure::AzureNetAppBackend;
use std::io::{self, Write};

pub async fn handle(config: &DeploymentConfig, yes: bool) -> anyhow::Result<()> {
    let plan = config.to_plan()?;
    let backend = AzureNetAppBackend::from_env().context("loading Azure credentials")?;
    let sequencer = Sequencer::new(backend);

    // Handles are rebuilt from the deployment file; nothing is stored
    // locally between up and down
    let handles = sequencer.resolve_all(&plan)?;

    if !yes {
        println!("{}", "This deletes the following resources:".bold());
        for handle in handles.iter().rev() {
            println!("  {handle}");
        }
        print!("Type 'yes' to continue: ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if answer.trim() != "yes" {
            println!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    tracing::info!(resources = handles.len(), "starting teardown");
    sequencer.teardown_ordered(&handles).await?;
    println!("{}", "Teardown complete.".green());
    Ok(())
}
