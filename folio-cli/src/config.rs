use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use folio_core::{ConnectionConfig, SiteConfig};
use serde::{Deserialize, Serialize};

/// Variables the site has always been deployed with. They apply unless the
/// `FOLIO_` equivalents are set.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("CONTENTFUL_SPACE_ID", "contentful.space_id"),
    ("CONTENTFUL_ACCESS_TOKEN", "contentful.access_token"),
];

/// Complete configuration that merges CLI args, env vars, config file, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FolioConfig {
    pub build: BuildConfig,
    pub contentful: ConnectionConfig,
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Output directory for the static export
    pub output: String,
    /// Template directory overriding the built-in theme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Static files served as-is and copied into the export
    pub public: String,
    /// Host for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: "./out".to_string(),
            theme: None,
            public: "./public".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
        }
    }
}

impl FolioConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (FOLIO_*)
    /// 3. CONTENTFUL_SPACE_ID / CONTENTFUL_ACCESS_TOKEN
    /// 4. Configuration file
    /// 5. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let legacy = LEGACY_ENV
            .iter()
            .filter_map(|(var, key)| std::env::var(var).ok().map(|value| (key.to_string(), value)))
            .collect();
        Self::load_with(args, legacy)
    }

    fn load_with(args: &ArgMatches, legacy: HashMap<String, String>) -> Result<Self> {
        let config_file = args
            .try_get_one::<String>("config")
            .unwrap_or(None)
            .cloned()
            .unwrap_or_else(|| "./folio.toml".to_string());

        let mut builder = ConfigBuilder::builder();

        builder = builder.add_source(ConfigBuilder::try_from(&Self::default())?);

        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        }

        if !legacy.is_empty() {
            builder = builder.add_source(ConfigBuilder::try_from(&nested(legacy))?);
        }

        // FOLIO_CONTENTFUL__SPACE_ID -> contentful.space_id
        builder = builder.add_source(
            Environment::with_prefix("FOLIO")
                .prefix_separator("_")
                .separator("__"),
        );

        let overrides = cli_overrides(args);
        if !overrides.is_empty() {
            builder = builder.add_source(ConfigBuilder::try_from(&nested(overrides))?);
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}

// Only args defined for the running subcommand are read; the rest are skipped.
fn cli_overrides(args: &ArgMatches) -> HashMap<String, String> {
    let mut overrides = HashMap::new();

    for (arg, key) in [
        ("output", "build.output"),
        ("theme", "build.theme"),
        ("public", "build.public"),
        ("host", "build.host"),
    ] {
        if let Some(value) = args.try_get_one::<String>(arg).unwrap_or(None) {
            overrides.insert(key.to_string(), value.clone());
        }
    }
    if let Some(port) = args.try_get_one::<u16>("port").unwrap_or(None) {
        overrides.insert("build.port".to_string(), port.to_string());
    }
    if args.try_get_one::<bool>("open").unwrap_or(None) == Some(&true) {
        overrides.insert("build.open".to_string(), "true".to_string());
    }

    overrides
}

/// Turn `section.key` pairs into the nested map the config builder expects.
fn nested(flat: HashMap<String, String>) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    for (path, value) in flat {
        if let Some((section, key)) = path.split_once('.') {
            sections
                .entry(section.to_string())
                .or_default()
                .insert(key.to_string(), value);
        }
    }
    sections
}
