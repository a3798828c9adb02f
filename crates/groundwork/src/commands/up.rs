//! `groundwork up`: provision and print outputs

use crate::StackArgs;
use anyhow::bail;
use groundwork_cloud::CloudProvider;

pub async fn execute(args: &StackArgs) -> anyhow::Result<()> {
    let (units, desired) = super::build_units(args)?;
    let provider = super::authenticated_provider(args).await?;

    let plan = provider.plan(&desired).await?;
    super::print_plan(&plan);

    if plan.has_changes {
        let result = provider.apply(&desired, &plan).await?;
        super::print_apply(&result);
        if !result.is_success() {
            bail!("apply finished with failures; created resources were left in place");
        }
    } else {
        println!("infrastructure is up to date");
    }

    // Output resolution reads the live resources, so it also serves as a
    // post-apply readiness check.
    let database_outputs = units.database.outputs(&provider).await?;
    let storage_outputs = units.storage.outputs(&provider).await?;
    super::print_outputs(&database_outputs);
    super::print_outputs(&storage_outputs);
    Ok(())
}
