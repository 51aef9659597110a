mod cmd;
mod config;

use anyhow::Result;
use clap::Command;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("folio")
        .about("Photography portfolio rendered from Contentful")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args).await,
        Some(("serve", args)) => cmd::serve::execute(args).await,
        _ => Ok(()),
    }
}
