//! Run configuration
//!
//! Built once by the binary from CLI flags and environment, then passed by
//! reference into each stage.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ImportError;

pub const DEFAULT_ENDPOINT: &str = "https://query.wikidata.org/sparql";
pub const DEFAULT_USER_AGENT: &str =
    "OpenMapTiles OSM name resolver (https://github.com/openmaptiles/openmaptiles)";
pub const DEFAULT_STORAGE_TABLE: &str = "wd_names";

/// Where the list of source tables comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    /// Tables named on the command line
    Explicit(Vec<String>),
    /// Discover tables from a tileset definition
    Tileset(PathBuf),
}

impl TableSource {
    /// Pick the table source. Explicit tables win over a tileset.
    pub fn select(tables: Vec<String>, tileset: Option<PathBuf>) -> Result<Self, ImportError> {
        if !tables.is_empty() {
            Ok(Self::Explicit(tables))
        } else if let Some(path) = tileset {
            Ok(Self::Tileset(path))
        } else {
            Err(ImportError::NoTableSource)
        }
    }
}

/// Database connection configuration
///
/// Unset fields fall through to the libpq `PG*` environment variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub connection_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: None,
            port: None,
            dbname: None,
            user: None,
            password: None,
            connection_timeout: Duration::from_secs(30),
        }
    }
}

impl DatabaseConfig {
    /// Human-readable target with the password removed
    pub fn describe(&self) -> String {
        if let Some(url) = &self.database_url {
            return mask_database_url(url);
        }
        format!(
            "postgresql://{}@{}:{}/{}",
            self.user.as_deref().unwrap_or("$PGUSER"),
            self.host.as_deref().unwrap_or("$PGHOST"),
            self.port
                .map(|p| p.to_string())
                .unwrap_or_else(|| "$PGPORT".to_string()),
            self.dbname.as_deref().unwrap_or("$PGDATABASE"),
        )
    }

    #[cfg(feature = "database")]
    pub fn connect_options(&self) -> Result<sqlx::postgres::PgConnectOptions, sqlx::Error> {
        use std::str::FromStr;

        let mut options = match &self.database_url {
            Some(url) => sqlx::postgres::PgConnectOptions::from_str(url)?,
            None => sqlx::postgres::PgConnectOptions::new(),
        };
        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(port) = self.port {
            options = options.port(port);
        }
        if let Some(dbname) = &self.dbname {
            options = options.database(dbname);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }

    /// Open the single-connection pool used for the whole run
    #[cfg(feature = "database")]
    pub async fn connect(&self) -> Result<sqlx::PgPool, sqlx::Error> {
        tracing::info!("Connecting to database: {}", self.describe());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(self.connection_timeout)
            .connect_with(self.connect_options()?)
            .await
    }
}

/// Settings for the SPARQL endpoint
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub endpoint: Url,
    /// Sent as `User-Agent` so the service can identify us
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Everything an import run needs
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub tables: TableSource,
    pub storage_table: String,
    pub database: DatabaseConfig,
    pub resolver: ResolverConfig,
}

/// Mask the password in a database URL for logging
fn mask_database_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("****"));
            parsed.to_string()
        }
        Ok(parsed) => parsed.to_string(),
        Err(_) => "<unparseable database url>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_tables_win() {
        let source = TableSource::select(
            vec!["osm_poi".to_string()],
            Some(PathBuf::from("openmaptiles.yaml")),
        )
        .unwrap();
        assert_eq!(source, TableSource::Explicit(vec!["osm_poi".to_string()]));
    }

    #[test]
    fn test_tileset_source() {
        let source = TableSource::select(vec![], Some(PathBuf::from("openmaptiles.yaml"))).unwrap();
        assert_eq!(source, TableSource::Tileset(PathBuf::from("openmaptiles.yaml")));
    }

    #[test]
    fn test_no_source_is_an_error() {
        assert!(matches!(
            TableSource::select(vec![], None),
            Err(ImportError::NoTableSource)
        ));
    }

    #[test]
    fn test_mask_database_url() {
        assert_eq!(
            mask_database_url("postgres://openmaptiles:secret@db:5432/openmaptiles"),
            "postgres://openmaptiles:****@db:5432/openmaptiles"
        );
        assert_eq!(
            mask_database_url("postgres://db/openmaptiles"),
            "postgres://db/openmaptiles"
        );
    }

    #[test]
    fn test_describe_without_url() {
        let config = DatabaseConfig {
            host: Some("db".to_string()),
            port: Some(5432),
            dbname: Some("openmaptiles".to_string()),
            user: Some("openmaptiles".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        };
        let described = config.describe();
        assert_eq!(described, "postgresql://openmaptiles@db:5432/openmaptiles");
        assert!(!described.contains("secret"));
    }

    #[test]
    fn test_default_resolver() {
        let config = ResolverConfig::default();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert!(config.user_agent.contains("OpenMapTiles"));
    }
}
