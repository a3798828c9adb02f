//! CLI subcommands

pub mod destroy;
pub mod preview;
pub mod up;

use crate::StackArgs;
use anyhow::bail;
use colored::Colorize;
use groundwork_cloud::{ActionType, ApplyResult, CloudProvider, Plan, ResourceSet, StackOutputs};
use groundwork_cloud_azure::AzureProvider;
use groundwork_infra::{DatabaseArgs, DatabaseStack, StorageArgs, StorageStack};
use std::collections::BTreeMap;

/// clap value parser for `--tag key=value`
pub fn parse_tag(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

pub struct Units {
    pub database: DatabaseStack,
    pub storage: StorageStack,
}

/// Instantiate both units and merge their desired state into one set.
pub fn build_units(args: &StackArgs) -> anyhow::Result<(Units, ResourceSet)> {
    let tags: BTreeMap<String, String> = args.tags.iter().cloned().collect();

    let database = DatabaseStack::new(
        format!("{}-database", args.name),
        DatabaseArgs {
            resource_group_name: args.resource_group.clone(),
            subnet_id: args.subnet_id.clone(),
            tags: tags.clone(),
            password: None,
        },
    )?;
    let storage = StorageStack::new(
        format!("{}-storage", args.name),
        StorageArgs {
            resource_group_name: args.resource_group.clone(),
            tags,
        },
    );

    let mut desired = database.resources();
    desired.merge(storage.resources());
    Ok((Units { database, storage }, desired))
}

/// Build the provider and fail early if az is missing or logged out.
pub async fn authenticated_provider(args: &StackArgs) -> anyhow::Result<AzureProvider> {
    let provider = AzureProvider::new(args.resource_group.clone());
    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        bail!(
            "not authenticated with {}: {}",
            provider.display_name(),
            auth.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    println!(
        "{} {}",
        "✓".green(),
        format!("authenticated as {}", auth.account_info.unwrap_or_default()).dimmed()
    );
    Ok(provider)
}

pub fn print_plan(plan: &Plan) {
    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Update => "~".yellow(),
            ActionType::Delete => "-".red(),
            ActionType::NoOp => "=".dimmed(),
        };
        println!("  {marker} {}", action.description);
    }
    println!("\n{}", plan.summary().to_string().bold());
}

pub fn print_apply(result: &ApplyResult) {
    for ok in &result.succeeded {
        println!("  {} {}", "✓".green(), ok.message);
    }
    for skipped in &result.skipped {
        println!("  {} {}", "…".yellow(), skipped.message);
    }
    for failed in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failed.action_id,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!(
        "\n{} succeeded, {} failed, {} skipped in {}ms",
        result.succeeded.len(),
        result.failed.len(),
        result.skipped.len(),
        result.duration_ms
    );
}

/// Print a unit's outputs. Secret values render redacted; nothing here
/// can leak them.
pub fn print_outputs(outputs: &StackOutputs) {
    println!("\n{}", format!("outputs of {}:", outputs.stack).bold());
    for (name, value) in outputs.iter() {
        if value.is_secret() {
            println!("  {name} = {}", value.to_string().dimmed());
        } else {
            println!("  {name} = {value}");
        }
    }
}
