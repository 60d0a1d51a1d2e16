//! `mirrorflow validate`: check the deployment file without API calls

use crate::config::DeploymentConfig;
use colored::Colorize;

pub fn handle(config: &DeploymentConfig) -> anyhow::Result<()> {
    let plan = config.to_plan()?;
    println!("{} deployment valid: {}", "✓".green(), plan.summary());
    Ok(())
}
