use crate::domain::{BranchPolicy, SemanticVersion};
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "release.toml";

/// Complete configuration for git-release.
///
/// Holds the per-branch release policies and the versioning rules.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_branches")]
    pub branches: Vec<BranchPolicy>,

    #[serde(default)]
    pub versioning: VersioningConfig,
}

/// Versioning rules shared by every branch.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersioningConfig {
    /// Treat a breaking change on a `0.x.y` version as a minor bump
    #[serde(default = "default_true")]
    pub pre_1_0_breaking_bumps_minor: bool,

    /// Version assumed when no previous tag exists
    #[serde(default = "default_initial_version")]
    pub initial_version: String,
}

fn default_true() -> bool {
    true
}

fn default_initial_version() -> String {
    "0.0.0".to_string()
}

/// Returns the default branch policies: `main`/`master` release, `develop` beta.
fn default_branches() -> Vec<BranchPolicy> {
    vec![
        BranchPolicy::release("main", "v"),
        BranchPolicy::release("master", "v"),
        BranchPolicy::prerelease("develop", "beta", "v"),
    ]
}

impl Default for VersioningConfig {
    fn default() -> Self {
        VersioningConfig {
            pre_1_0_breaking_bumps_minor: default_true(),
            initial_version: default_initial_version(),
        }
    }
}

impl VersioningConfig {
    pub fn initial_version(&self) -> Result<SemanticVersion> {
        self.initial_version.parse().map_err(|e| {
            ReleaseError::config(format!(
                "initial_version '{}' is not a semantic version: {}",
                self.initial_version, e
            ))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            branches: default_branches(),
            versioning: VersioningConfig::default(),
        }
    }
}

impl Config {
    /// Policy for `branch`, or an invalid-policy error for unconfigured branches
    pub fn policy_for(&self, branch: &str) -> Result<&BranchPolicy> {
        self.branches
            .iter()
            .find(|p| p.branch_name == branch)
            .ok_or_else(|| {
                ReleaseError::branch_policy(format!(
                    "Branch '{}' has no release policy (configured: {})",
                    branch,
                    self.branch_names().join(", ")
                ))
            })
    }

    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|p| p.branch_name.as_str()).collect()
    }

    /// Check every branch policy and the versioning section
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for policy in &self.branches {
            policy.validate()?;
            if !seen.insert(policy.branch_name.as_str()) {
                return Err(ReleaseError::branch_policy(format!(
                    "Branch '{}' is configured more than once",
                    policy.branch_name
                )));
            }
        }
        self.versioning.initial_version()?;
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in current directory
/// 3. `~/.config/.release.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if local.exists() {
        fs::read_to_string(local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    tracing::debug!(branches = config.branches.len(), "loaded configuration");
    Ok(config)
}
