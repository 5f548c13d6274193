use anyhow::Result;
use clap::Parser;
use downloads_sync::{
    aggregate::AssetSelector,
    commands::{
        self,
        config::{Config, DatabaseConfig, SourceConfig},
    },
    database::{CollectionTarget, DEFAULT_APP_SERVICES_URL, DEFAULT_DATA_SOURCE},
    github::{DEFAULT_MAX_PAGES, DEFAULT_RELEASES_URL},
    storefront::DEFAULT_PRODUCTS_URL,
};

/// downloads-sync - release and supporter download counter
///
/// Sums release asset downloads from GitHub and supporter sales from the
/// storefront, then writes one summary document to the hosted database.
///
/// Every option can also be given through the environment variable shown in
/// its help. Meant to be invoked by an external scheduler (cron, systemd timer).
///
/// Examples:
///   downloads-sync run     # Fetch, aggregate and upsert the summary
///   downloads-sync show    # Fetch and print the summary only
#[derive(Parser, Debug)]
#[command(author, version = env!("DOWNLOADS_SYNC_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the sync job once and write the summary
    Run(RunArgs),

    /// Print the current summary without writing it
    Show(SourceArgs),
}

#[derive(clap::Args, Debug)]
struct SourceArgs {
    /// GitHub API token
    #[arg(long, env = "GITHUB_APIKEY", hide_env_values = true)]
    github_token: String,

    /// Storefront API token
    #[arg(long, env = "GUMROAD_APIKEY", hide_env_values = true)]
    storefront_token: String,

    /// Release listing endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_RELEASES_URL)]
    releases_url: String,

    /// Product listing endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_PRODUCTS_URL)]
    products_url: String,

    /// Maximum number of release pages to fetch
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_PAGES,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_pages: u32,

    /// Glob matching the basic build asset name (default: first asset)
    #[arg(long, value_name = "GLOB", requires = "update_asset")]
    basic_asset: Option<String>,

    /// Glob matching the update build asset name (default: second asset)
    #[arg(long, value_name = "GLOB", requires = "basic_asset")]
    update_asset: Option<String>,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    sources: SourceArgs,

    /// App Services application id
    #[arg(long, env = "REALM_APPID")]
    app_id: String,

    /// App Services API key
    #[arg(long, env = "REALM_APIKEY", hide_env_values = true)]
    app_api_key: String,

    /// Database name
    #[arg(long, env = "DB")]
    database: String,

    /// Collection name
    #[arg(long, env = "COLLECTION")]
    collection: String,

    /// Error reporting DSN
    #[arg(long, env = "SENTRY_DSN", hide_env_values = true)]
    sentry_dsn: String,

    /// App Services base URL
    #[arg(long, value_name = "URL", default_value = DEFAULT_APP_SERVICES_URL)]
    app_services_url: String,

    /// Linked data source name
    #[arg(long, default_value = DEFAULT_DATA_SOURCE)]
    data_source: String,
}

impl SourceArgs {
    fn into_config(self) -> Result<SourceConfig> {
        let selector = match (&self.basic_asset, &self.update_asset) {
            (Some(basic), Some(update)) => AssetSelector::by_name(basic, update)?,
            _ => AssetSelector::Positional,
        };

        Ok(SourceConfig {
            releases_url: self.releases_url,
            github_token: self.github_token,
            products_url: self.products_url,
            storefront_token: self.storefront_token,
            max_pages: self.max_pages,
            selector,
        })
    }
}

impl RunArgs {
    fn into_config(self) -> Result<Config> {
        Ok(Config {
            sources: self.sources.into_config()?,
            database: DatabaseConfig {
                app_services_url: self.app_services_url,
                app_id: self.app_id,
                api_key: self.app_api_key,
                target: CollectionTarget {
                    data_source: self.data_source,
                    database: self.database,
                    collection: self.collection,
                },
            },
            sentry_dsn: self.sentry_dsn,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            // A failed run has already been reported; the scheduler sees a normal exit.
            commands::run(args.into_config()?).await?;
        }
        Commands::Show(args) => {
            commands::show(args.into_config()?).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const RUN_ARGS: &[&str] = &[
        "downloads-sync",
        "run",
        "--github-token",
        "gh",
        "--storefront-token",
        "gr",
        "--app-id",
        "app",
        "--app-api-key",
        "key",
        "--database",
        "db",
        "--collection",
        "stats",
        "--sentry-dsn",
        "https://k@sentry.example.com/1",
    ];

    #[test]
    fn test_cli_run_parsing() {
        let cli = Cli::try_parse_from(RUN_ARGS).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("Expected Run command");
        };

        let config = args.into_config().unwrap();
        assert_eq!(config.sources.releases_url, DEFAULT_RELEASES_URL);
        assert_eq!(config.sources.max_pages, DEFAULT_MAX_PAGES);
        assert!(matches!(config.sources.selector, AssetSelector::Positional));
        assert_eq!(config.database.target.data_source, DEFAULT_DATA_SOURCE);
        assert_eq!(config.database.target.database, "db");
        assert_eq!(config.database.target.collection, "stats");
    }

    #[test]
    fn test_cli_show_parsing() {
        let cli = Cli::try_parse_from([
            "downloads-sync",
            "show",
            "--github-token",
            "gh",
            "--storefront-token",
            "gr",
            "--basic-asset",
            "*Basic*",
            "--update-asset",
            "*Update*",
            "--max-pages",
            "5",
        ])
        .unwrap();
        let Commands::Show(args) = cli.command else {
            panic!("Expected Show command");
        };

        let config = args.into_config().unwrap();
        assert_eq!(config.max_pages, 5);
        assert!(matches!(config.selector, AssetSelector::ByName { .. }));
    }

    #[test]
    fn test_cli_asset_patterns_come_in_pairs() {
        let mut args = RUN_ARGS.to_vec();
        args.extend(["--basic-asset", "*Basic*"]);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_pages() {
        let mut args = RUN_ARGS.to_vec();
        args.extend(["--max-pages", "0"]);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["downloads-sync"]).is_err());
    }
}
