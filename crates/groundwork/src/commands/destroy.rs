//! `groundwork destroy`: tear down declared resources
//!
//! Protected resources make this fail closed unless `--force` is given;
//! the protection check covers the whole set before anything is deleted.

use crate::StackArgs;
use anyhow::bail;
use colored::Colorize;
use groundwork_cloud::{CloudError, CloudProvider, destroy_plan};

pub async fn execute(args: &StackArgs, force: bool) -> anyhow::Result<()> {
    let (_units, desired) = super::build_units(args)?;

    let mut plan = match destroy_plan(&desired, force) {
        Ok(plan) => plan,
        Err(CloudError::ProtectedResource(key)) => {
            bail!("{key} is protected; re-run with --force to delete it");
        }
        Err(e) => return Err(e.into()),
    };

    let provider = super::authenticated_provider(args).await?;

    // Only delete what actually exists, so destroy stays idempotent.
    let current = provider.get_state(&desired).await?;
    plan.actions.retain(|a| current.get(&a.resource_key).is_some());

    if plan.actions.is_empty() {
        println!("nothing to destroy");
        return Ok(());
    }

    println!(
        "{}",
        format!("destroying {} resources", plan.actions.len()).red().bold()
    );
    let result = provider.apply(&desired, &plan).await?;
    super::print_apply(&result);
    if !result.is_success() {
        bail!("destroy finished with failures");
    }
    Ok(())
}
