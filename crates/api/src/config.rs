//! Process configuration read from the environment.
//!
//! | variable | meaning |
//! |---|---|
//! | `BIND_ADDR` | listen address, default `0.0.0.0:8080` |
//! | `DATABASE_URL` | Postgres adapters when set, in-memory otherwise |
//! | `STOCKPULSE_BRANCHES` | comma-separated branch codes |
//! | `STOCKPULSE_SOURCE_FILE` | JSON source tables (items, stock, monthly demand) used without a database |
//! | `STOCKPULSE_RULES_FILE` | JSON rule overrides (partial files allowed) |
//! | `STOCKPULSE_RETRY_MAX_ATTEMPTS` | attempts per branch, first one included |
//! | `STOCKPULSE_RETRY_BASE_MS` | base backoff delay |
//! | `STOCKPULSE_RETRY_MAX_DELAY_MS` | backoff delay cap |
//! | `STOCKPULSE_RETRY_STRATEGY` | `fixed`, `exponential` (default) or `linear` |
//! | `STOCKPULSE_BRANCH_TIMEOUT_SECS` | per-attempt branch timeout |

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use stockpulse_core::BranchCode;
use stockpulse_infra::{BackoffStrategy, PipelineConfig};
use stockpulse_infra::provider::SourceTables;
use stockpulse_replenishment::ReplenishmentConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub source_file: Option<PathBuf>,
    pub rules: ReplenishmentConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a socket address")?;

        let rules = match get("STOCKPULSE_RULES_FILE") {
            Some(path) => load_rules(Path::new(&path))?,
            None => ReplenishmentConfig::default(),
        };

        let mut pipeline = PipelineConfig::default();
        if let Some(raw) = get("STOCKPULSE_BRANCHES") {
            pipeline.branches = parse_branches(&raw)?;
        }
        if let Some(n) = parse_var::<u32>(&get, "STOCKPULSE_RETRY_MAX_ATTEMPTS")? {
            pipeline.retry.max_attempts = n.max(1);
        }
        if let Some(ms) = parse_var::<u64>(&get, "STOCKPULSE_RETRY_BASE_MS")? {
            pipeline.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&get, "STOCKPULSE_RETRY_MAX_DELAY_MS")? {
            pipeline.retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(raw) = get("STOCKPULSE_RETRY_STRATEGY") {
            pipeline.retry.strategy = BackoffStrategy::parse(&raw)
                .with_context(|| format!("STOCKPULSE_RETRY_STRATEGY={raw:?} is not fixed, exponential or linear"))?;
        }
        if let Some(secs) = parse_var::<u64>(&get, "STOCKPULSE_BRANCH_TIMEOUT_SECS")? {
            pipeline.branch_timeout = Duration::from_secs(secs);
        }

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            source_file: get("STOCKPULSE_SOURCE_FILE").map(PathBuf::from),
            rules,
            pipeline,
        })
    }
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    get(key)
        .map(|raw| raw.parse::<T>().with_context(|| format!("{key}={raw:?} is not a valid number")))
        .transpose()
}

fn parse_branches(raw: &str) -> Result<Vec<BranchCode>> {
    let branches = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| BranchCode::new(s).with_context(|| format!("invalid branch code {s:?}")))
        .collect::<Result<Vec<_>>>()?;

    anyhow::ensure!(!branches.is_empty(), "STOCKPULSE_BRANCHES lists no branches");
    Ok(branches)
}

pub fn load_rules(path: &Path) -> Result<ReplenishmentConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading rules file {}", path.display()))?;
    let rules: ReplenishmentConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing rules file {}", path.display()))?;
    rules
        .validate()
        .with_context(|| format!("validating rules file {}", path.display()))?;
    Ok(rules)
}

pub fn load_source_tables(path: &Path) -> Result<SourceTables> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading source file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing source file {}", path.display()))
}
