use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use folio_server::{PortfolioServer, ServerConfig};

use crate::cmd::{add_common_args, connect};
use crate::config::FolioConfig;

pub fn make_subcommand() -> Command {
    add_common_args(Command::new("serve"))
        .about("Serve the portfolio, regenerating pages as their content ages")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = FolioConfig::load(args)?;
    let site = connect(&config)?;

    let server_config = ServerConfig {
        host: config.build.host.clone(),
        port: config.build.port,
        open: config.build.open,
    };

    PortfolioServer::new(server_config, site).run().await
}
