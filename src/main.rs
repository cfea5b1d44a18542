use clap::Parser;
use fabric_deploy_gen::cli::args::{Cli, Command};
use fabric_deploy_gen::cli::commands::{run_compose, run_topology, run_upload};
use fabric_deploy_gen::common::config::load_deploy_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = load_deploy_config(&cli.config)?;

    match &cli.command {
        Command::Topology(args) => {
            run_topology(args, &config)?;
        }
        Command::Compose(args) => {
            run_compose(args, &config)?;
        }
        Command::Upload(args) => {
            run_upload(args, &config).await?;
        }
    }
    Ok(())
}
