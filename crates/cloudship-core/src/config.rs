use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default location of the deploy configuration, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// config.json configuration
///
/// `dryRun` and `debug` have no defaults: a config file that omits either
/// one fails to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    /// Print commands instead of running them
    pub dry_run: bool,
    /// Print each command and its exit code around execution
    pub debug: bool,
    /// Directory holding the per-environment `<env>.env.yaml` files
    #[serde(default = "default_configs_location")]
    pub configs_location: String,
    /// Service account per environment name
    #[serde(default)]
    pub service_accounts: BTreeMap<String, String>,
    /// Cloud Build config submitted with the build
    #[serde(default = "default_build_config")]
    pub build_config: String,
    /// Container registry host
    #[serde(default = "default_registry")]
    pub registry: String,
    /// Cloud Run platform
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl DeployConfig {
    /// Load from a JSON file. A missing or malformed file is an error.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::debug!(
            path = %path.display(),
            dry_run = config.dry_run,
            debug = config.debug,
            "config loaded",
        );
        Ok(config)
    }

    /// Force dry-run and/or debug on. Flags that are `false` leave the
    /// loaded value untouched.
    pub fn with_overrides(mut self, dry_run: bool, debug: bool) -> Self {
        self.dry_run |= dry_run;
        self.debug |= debug;
        self
    }

    /// Service account bound to `environment`.
    pub fn service_account(&self, environment: &str) -> crate::Result<&str> {
        self.service_accounts
            .get(environment)
            .map(String::as_str)
            .ok_or_else(|| crate::Error::NoServiceAccount {
                environment: environment.to_owned(),
                known: self.service_accounts.keys().cloned().collect(),
            })
    }

    /// `{configsLocation}/{environment}.env.yaml`
    pub fn env_vars_file(&self, environment: &str) -> PathBuf {
        Path::new(&self.configs_location).join(format!("{environment}.env.yaml"))
    }
}

fn default_configs_location() -> String {
    "configs".to_owned()
}

fn default_build_config() -> String {
    "build/package/cloudbuild.yaml".to_owned()
}

fn default_registry() -> String {
    "gcr.io".to_owned()
}

fn default_platform() -> String {
    "managed".to_owned()
}
