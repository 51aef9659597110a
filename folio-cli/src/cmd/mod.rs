pub mod build;
pub mod serve;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use folio_core::{ContentAccess, ContentfulClient, Site, SiteBuilder};

use crate::config::FolioConfig;

pub fn add_common_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Template directory overriding the built-in theme"),
        )
        .arg(
            Arg::new("public")
                .long("public")
                .value_name("DIR")
                .help("Static asset directory"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value("./folio.toml"),
        )
}

/// Connect to Contentful and assemble the site. Missing credentials stop here.
pub fn connect(config: &FolioConfig) -> Result<Site<ContentfulClient>> {
    let client = ContentfulClient::new(&config.contentful)
        .context("Contentful is not configured")?;

    let mut builder = SiteBuilder::new()
        .output_dir(&config.build.output)
        .public_dir(&config.build.public)
        .site_config(config.site.clone());
    if let Some(theme) = &config.build.theme {
        builder = builder.theme_dir(theme);
    }

    builder
        .build(ContentAccess::new(client))
        .context("failed to load templates")
}
