mod commands;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "groundwork")]
#[command(about = "Provision self-hosted service infrastructure", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what a run would change, without applying anything
    Preview(StackArgs),

    /// Provision the declared infrastructure and print unit outputs
    Up(StackArgs),

    /// Tear down the declared infrastructure
    Destroy {
        #[command(flatten)]
        stack: StackArgs,

        /// Required to delete protected resources (server, database,
        /// storage account, containers)
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct StackArgs {
    /// Logical environment name, prefixed onto unit and resource names
    #[arg(long, default_value = "selfhosted")]
    name: String,

    /// Existing resource group to provision into
    #[arg(long, env = "GROUNDWORK_RESOURCE_GROUP")]
    resource_group: String,

    /// Subnet id the database server is reachable from
    #[arg(long, env = "GROUNDWORK_SUBNET_ID")]
    subnet_id: String,

    /// Tag applied to taggable resources, as key=value (repeatable)
    #[arg(long = "tag", value_parser = commands::parse_tag)]
    tags: Vec<(String, String)>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => commands::preview::execute(&args).await,
        Commands::Up(args) => commands::up::execute(&args).await,
        Commands::Destroy { stack, force } => commands::destroy::execute(&stack, force).await,
    }
}
