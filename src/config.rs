// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;

use crate::rules::DEFAULT_LEADERBOARD_LIMIT;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database URL (SQLite connection string).
    pub database_url: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Optional JSON catalog replacing the built-in species tables.
    pub catalog_path: Option<PathBuf>,
    /// Number of rows returned by the leaderboard.
    pub leaderboard_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite:pokebot.db?mode=rwc".to_string(),
            port: 3000,
            catalog_path: None,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite connection string (default: `sqlite:pokebot.db?mode=rwc`)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `CATALOG_PATH` - JSON file with `starters` and `wild` species lists
    /// - `LEADERBOARD_LIMIT` - leaderboard size (default: 10)
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--catalog <PATH>` - Override the catalog file
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();

        let database_url = env("DATABASE_URL").unwrap_or(defaults.database_url);

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(defaults.port);

        let catalog_path = Self::parse_cli_value(args, "--catalog")
            .or_else(|| env("CATALOG_PATH"))
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let leaderboard_limit = env("LEADERBOARD_LIMIT")
            .and_then(|v| v.parse().ok())
            .filter(|&n: &u32| n > 0)
            .unwrap_or(defaults.leaderboard_limit);

        Config {
            database_url,
            port,
            catalog_path,
            leaderboard_limit,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
