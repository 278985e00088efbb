use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Published team-season table the dashboard reads by default.
pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/SatBalakumar/ncaa-basketball-tempo-playstyle-dashboard/refs/heads/main/dashboard/team_AllSeasons_df_test.csv";

pub const DEFAULT_CONFERENCES: &[&str] = &["big_ten"];

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

pub const ENV_SOURCE: &str = "TEMPO_DASH_SOURCE";
pub const ENV_DEFAULT_CONFERENCES: &str = "TEMPO_DASH_DEFAULT_CONFERENCES";
pub const ENV_HTTP_TIMEOUT: &str = "TEMPO_DASH_HTTP_TIMEOUT";

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Where the team-season table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Fetched over HTTP(S); always parsed as CSV.
    Url(String),
    /// Local file, dispatched by extension.
    Path(PathBuf),
}

impl DataSource {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            DataSource::Url(s.to_string())
        } else {
            DataSource::Path(PathBuf::from(s))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Start-up settings. Resolved once from the command line and environment;
/// the first positional argument wins over `TEMPO_DASH_SOURCE`.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub source: DataSource,
    /// Conferences selected when the session starts.
    pub default_conferences: Vec<String>,
    pub http_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Url(DEFAULT_SOURCE_URL.to_string()),
            default_conferences: DEFAULT_CONFERENCES.iter().map(|s| s.to_string()).collect(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl DashboardConfig {
    /// Resolve from the real process arguments and environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Resolve from explicit inputs. `args` excludes the program name.
    pub fn resolve<A, E>(args: A, env: E) -> Result<Self>
    where
        A: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut config = DashboardConfig::default();

        let positional = args.into_iter().find(|a| !a.starts_with('-'));
        if let Some(source) = positional.or_else(|| env(ENV_SOURCE)) {
            config.source = DataSource::parse(&source);
        }

        if let Some(list) = env(ENV_DEFAULT_CONFERENCES) {
            config.default_conferences = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(secs) = env(ENV_HTTP_TIMEOUT) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("{ENV_HTTP_TIMEOUT}: '{secs}' is not a whole number of seconds"))?;
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_published_csv() {
        let config = DashboardConfig::resolve(Vec::new(), env_from(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert!(matches!(config.source, DataSource::Url(_)));
        assert_eq!(config.default_conferences, vec!["big_ten".to_string()]);
    }

    #[test]
    fn positional_argument_beats_environment() {
        let env = env_from(&[(ENV_SOURCE, "https://example.org/t.csv")]);
        let config = DashboardConfig::resolve(vec!["data/teams.parquet".to_string()], env).unwrap();
        assert_eq!(config.source, DataSource::Path(PathBuf::from("data/teams.parquet")));
    }

    #[test]
    fn environment_overrides_apply() {
        let env = env_from(&[
            (ENV_SOURCE, "https://example.org/t.csv"),
            (ENV_DEFAULT_CONFERENCES, "acc, big_east,,"),
            (ENV_HTTP_TIMEOUT, "5"),
        ]);
        let config = DashboardConfig::resolve(Vec::new(), env).unwrap();
        assert_eq!(config.source, DataSource::Url("https://example.org/t.csv".into()));
        assert_eq!(config.default_conferences, vec!["acc", "big_east"]);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_is_an_error() {
        let env = env_from(&[(ENV_HTTP_TIMEOUT, "soon")]);
        assert!(DashboardConfig::resolve(Vec::new(), env).is_err());
    }
}
