use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use tracing::info;

use crate::cmd::{add_common_args, connect};
use crate::config::FolioConfig;

pub fn make_subcommand() -> Command {
    add_common_args(Command::new("build"))
        .about("Export every page of the portfolio as static HTML")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated site"),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = FolioConfig::load(args)?;
    let site = connect(&config)?;

    let written = site
        .render_all()
        .await
        .with_context(|| format!("failed to export site to {}", config.build.output))?;

    info!(files = written.len(), output = %config.build.output, "site built");

    Ok(())
}
