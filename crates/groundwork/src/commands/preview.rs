//! `groundwork preview`: plan without applying

use crate::StackArgs;
use groundwork_cloud::CloudProvider;

pub async fn execute(args: &StackArgs) -> anyhow::Result<()> {
    let (_units, desired) = super::build_units(args)?;
    let provider = super::authenticated_provider(args).await?;

    let plan = provider.plan(&desired).await?;
    super::print_plan(&plan);

    if !plan.has_changes {
        println!("infrastructure is up to date");
    }
    Ok(())
}
