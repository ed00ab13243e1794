//! Environment variable access.
//!
//! Every lookup goes through an [`EnvSource`] handed to the code that needs
//! it, so the deploy pipeline can be driven from an in-memory map in tests.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use secrecy::SecretString;

pub const ENVIRONMENT: &str = "ENVIRONMENT";
pub const GITHUB_REF: &str = "GITHUB_REF";
pub const GOOGLE_PROJECT_ID: &str = "GOOGLE_PROJECT_ID";
pub const SERVICE_NAME: &str = "SERVICE_NAME";
pub const GIT_USERNAME: &str = "GIT_USERNAME";
pub const GIT_TOKEN: &str = "GIT_TOKEN";
pub const GOOGLE_REGION: &str = "GOOGLE_REGION";

/// Read-only view of environment variables.
pub trait EnvSource {
    /// Value of `key`, or `None` when unset or blank.
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment, optionally layered over a dotenv file.
///
/// Variables already present in the process take precedence over the file.
#[derive(Debug, Default)]
pub struct ProcessEnv {
    file: HashMap<String, String>,
}

impl ProcessEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer the process environment over the `KEY=VALUE` pairs in `path`.
    pub fn with_env_file(path: &Path) -> crate::Result<Self> {
        let to_error = |e| crate::Error::EnvFile {
            path: path.to_path_buf(),
            source: e,
        };

        let mut file = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(to_error)? {
            let (key, value) = item.map_err(to_error)?;
            file.insert(key, value);
        }

        tracing::debug!(path = %path.display(), count = file.len(), "env file loaded");
        Ok(Self { file })
    }
}

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        // arch-lint: allow(no-silent-result-drop) reason="unset or non-unicode variables fall back to the env file"
        layered(std::env::var(key).ok(), self.file.get(key))
    }
}

/// First non-blank of the process value and the env file value.
fn layered(process: Option<String>, file: Option<&String>) -> Option<String> {
    let present = |v: &String| !v.trim().is_empty();
    process.filter(present).or_else(|| file.filter(|v| present(v)).cloned())
}

/// In-memory environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).filter(|v| !v.trim().is_empty()).cloned()
    }
}

/// Environment variables consumed by a deploy, resolved once.
///
/// Missing values are substituted with empty strings and reported with a
/// warning; the external tools reject them with their own diagnostics.
/// `GITHUB_REF` stays optional because only production builds need it.
#[derive(Clone)]
pub struct DeployEnv {
    pub environment: String,
    pub git_ref: Option<String>,
    pub project_id: String,
    pub service_name: String,
    pub region: String,
    pub git_username: String,
    pub git_token: SecretString,
}

impl fmt::Debug for DeployEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployEnv")
            .field("environment", &self.environment)
            .field("git_ref", &self.git_ref)
            .field("project_id", &self.project_id)
            .field("service_name", &self.service_name)
            .field("region", &self.region)
            .field("git_username", &self.git_username)
            .field("git_token", &"[REDACTED]")
            .finish()
    }
}

impl DeployEnv {
    pub fn resolve(source: &impl EnvSource) -> Self {
        Self {
            environment: lenient(source, ENVIRONMENT),
            git_ref: source.var(GITHUB_REF),
            project_id: lenient(source, GOOGLE_PROJECT_ID),
            service_name: lenient(source, SERVICE_NAME),
            region: lenient(source, GOOGLE_REGION),
            git_username: lenient(source, GIT_USERNAME),
            git_token: SecretString::from(lenient(source, GIT_TOKEN)),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn lenient(source: &impl EnvSource, key: &str) -> String {
    source.var(key).unwrap_or_else(|| {
        tracing::warn!(variable = key, "environment variable not set, using empty value");
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn resolve_reads_all_variables() {
        let env: MapEnv = [
            (ENVIRONMENT, "staging"),
            (GITHUB_REF, "refs/heads/main"),
            (GOOGLE_PROJECT_ID, "proj"),
            (SERVICE_NAME, "svc"),
            (GOOGLE_REGION, "europe-west1"),
            (GIT_USERNAME, "bot"),
            (GIT_TOKEN, "ghp_secret"),
        ]
        .into_iter()
        .collect();

        let resolved = DeployEnv::resolve(&env);
        assert_eq!(resolved.environment, "staging");
        assert_eq!(resolved.git_ref.as_deref(), Some("refs/heads/main"));
        assert_eq!(resolved.project_id, "proj");
        assert_eq!(resolved.service_name, "svc");
        assert_eq!(resolved.region, "europe-west1");
        assert_eq!(resolved.git_username, "bot");
        assert_eq!(resolved.git_token.expose_secret(), "ghp_secret");
        assert!(!resolved.is_production());
    }

    #[test]
    fn process_value_wins_over_env_file() {
        let file = "production".to_owned();
        assert_eq!(
            layered(Some("staging".to_owned()), Some(&file)).as_deref(),
            Some("staging")
        );
    }

    #[test]
    fn blank_process_value_falls_back_to_env_file() {
        let file = "production".to_owned();
        assert_eq!(
            layered(Some("  ".to_owned()), Some(&file)).as_deref(),
            Some("production")
        );
        assert_eq!(layered(None, Some(&file)).as_deref(), Some("production"));
    }

    #[test]
    fn blank_everywhere_is_unset() {
        let blank = String::new();
        assert_eq!(layered(Some(String::new()), Some(&blank)), None);
        assert_eq!(layered(None, None), None);
    }

    #[test]
    fn missing_variables_become_empty() {
        let resolved = DeployEnv::resolve(&MapEnv::new().with(SERVICE_NAME, "svc"));
        assert_eq!(resolved.service_name, "svc");
        assert_eq!(resolved.region, "");
        assert_eq!(resolved.git_username, "");
        assert!(resolved.git_ref.is_none());
    }

    #[test]
    fn blank_values_count_as_missing() {
        let env = MapEnv::new().with(GITHUB_REF, "   ");
        assert!(env.var(GITHUB_REF).is_none());
    }

    #[test]
    fn debug_redacts_token() {
        let resolved = DeployEnv::resolve(&MapEnv::new().with(GIT_TOKEN, "ghp_secret"));
        let debug = format!("{resolved:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
