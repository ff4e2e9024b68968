//! import-wikidata - resolve OSM wikidata tags into multilingual names
//!
//! Run with:
//!   import-wikidata --tileset openmaptiles.yaml
//!   import-wikidata --table osm_poi_point --table osm_water_name --storage wd_names
//!
//! Connection settings fall back to POSTGRES_* and then to the libpq PG*
//! variables; DATABASE_URL overrides the discrete settings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use osm_wikidata_labels::config::{DEFAULT_ENDPOINT, DEFAULT_STORAGE_TABLE, DEFAULT_USER_AGENT};
use osm_wikidata_labels::{
    resolve_tables, DatabaseConfig, ImportConfig, ImportPipeline, PgLabelStore, ResolverConfig,
    TableSource, WikidataClient,
};

#[derive(Parser)]
#[command(name = "import-wikidata")]
#[command(about = "Load Wikidata labels for OSM features that carry a wikidata tag")]
struct Cli {
    /// Tileset definition used to find tables with an hstore tags field
    #[arg(long, env = "TILESET_FILE")]
    tileset: Option<PathBuf>,

    /// Table to scan (repeatable); overrides --tileset
    #[arg(long = "table", value_name = "TABLE")]
    tables: Vec<String>,

    /// Destination table, truncated and reloaded on every run
    #[arg(long, default_value = DEFAULT_STORAGE_TABLE)]
    storage: String,

    /// Full connection URL; overrides the discrete connection flags
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[arg(long, env = "POSTGRES_HOST")]
    pghost: Option<String>,

    #[arg(long, env = "POSTGRES_PORT")]
    pgport: Option<u16>,

    #[arg(long, env = "POSTGRES_DB")]
    dbname: Option<String>,

    #[arg(long, env = "POSTGRES_USER")]
    user: Option<String>,

    #[arg(long, env = "POSTGRES_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// SPARQL endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: url::Url,

    /// User-Agent sent to the query service
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "300")]
    timeout: u64,

    /// Log SQL and SPARQL queries
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<ImportConfig> {
        Ok(ImportConfig {
            tables: TableSource::select(self.tables, self.tileset)?,
            storage_table: self.storage,
            database: DatabaseConfig {
                database_url: self.database_url,
                host: self.pghost,
                port: self.pgport,
                dbname: self.dbname,
                user: self.user,
                password: self.password,
                ..Default::default()
            },
            resolver: ResolverConfig {
                endpoint: self.endpoint,
                user_agent: self.user_agent,
                timeout: Duration::from_secs(self.timeout),
            },
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "osm_wikidata_labels=debug,import_wikidata=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.into_config()?;

    // Fail on a bad table source before touching the database
    let tables = resolve_tables(&config.tables)?;

    let pool = config
        .database
        .connect()
        .await
        .context("Failed to connect to database")?;
    let store = PgLabelStore::new(pool, &config.storage_table)?;
    let client = WikidataClient::new(&config.resolver).context("Failed to create HTTP client")?;

    let summary = ImportPipeline::new(&store, &client).run(&tables).await?;

    println!("{}", summary);
    Ok(())
}
