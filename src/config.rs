// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info};
use url::Url;

use crate::process::Status;

pub const ENV_SITE_ROOT: &str = "CLEMENCY_SITE_ROOT";
pub const ENV_OUTPUT_DIR: &str = "CLEMENCY_OUTPUT_DIR";
pub const ENV_FAILURE_POLICY: &str = "CLEMENCY_FAILURE_POLICY";

static DEFAULT_SITE_ROOT: &str = "https://www.justice.gov";

static RECIPIENTS_URL: &str = "https://www.justice.gov/pardon/clemencyrecipients";
static RECIPIENTS_LOCATOR: &str = "body > section:nth-of-type(3) > div:nth-of-type(2) > div > div > div \
     > div:nth-of-type(1) > div > div > div:nth-of-type(1) > div > div > div > div > div > div > p";

static DENIALS_URL: &str = "https://www.justice.gov/pardon/clemency-denials";
static DENIALS_LOCATOR: &str = "body > section:nth-of-type(3) > div:nth-of-type(2) > div > div > div \
     > article > div:nth-of-type(1) > div > div > div > p";

/// What to do when a single document page cannot be fetched or has no tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Abort,
    SkipAndReport,
}

impl FailurePolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "abort" => Some(FailurePolicy::Abort),
            "skip_and_report" | "skip" => Some(FailurePolicy::SkipAndReport),
            _ => None,
        }
    }
}

/// One directory page and the status its documents report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub status: Status,
    pub directory_url: String,
    /// CSS selector for the link-bearing blocks on the directory page.
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site_root: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub failure_policy: FailurePolicy,
    pub output_dir: PathBuf,
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_root: DEFAULT_SITE_ROOT.to_string(),
            user_agent: concat!("clemency_scraper/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            failure_policy: FailurePolicy::default(),
            output_dir: PathBuf::from("output"),
            sources: vec![
                SourceConfig {
                    status: Status::Granted,
                    directory_url: RECIPIENTS_URL.to_string(),
                    locator: RECIPIENTS_LOCATOR.to_string(),
                },
                SourceConfig {
                    status: Status::Denied,
                    directory_url: DENIALS_URL.to_string(),
                    locator: DENIALS_LOCATOR.to_string(),
                },
            ],
        }
    }
}

impl Config {
    /// Defaults, overlaid by the YAML file at `path` (if any), overlaid by
    /// `CLEMENCY_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => {
                info!(path = %p.display(), "loading config");
                let text = fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                Self::from_yaml(&text).with_context(|| format!("parsing config {}", p.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_overrides(|key| env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_SITE_ROOT) {
            debug!(%root, "site root overridden from env");
            self.site_root = root;
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(policy) = lookup(ENV_FAILURE_POLICY) {
            self.failure_policy = FailurePolicy::from_str(&policy)
                .with_context(|| format!("{} has unknown value `{}`", ENV_FAILURE_POLICY, policy))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let root = Url::parse(&self.site_root)
            .with_context(|| format!("site root `{}` is not a URL", self.site_root))?;
        if !matches!(root.scheme(), "http" | "https") || root.host_str().is_none() {
            bail!("site root `{}` must be an absolute http(s) URL", self.site_root);
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be positive");
        }
        for src in &self.sources {
            Url::parse(&src.directory_url)
                .with_context(|| format!("directory URL `{}` is not a URL", src.directory_url))?;
            if src.locator.trim().is_empty() {
                bail!("source {} has an empty locator", src.directory_url);
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
