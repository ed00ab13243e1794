use std::path::Path;

/// Default location of the secrets list, relative to the working directory.
pub const DEFAULT_SECRETS_PATH: &str = "configs/secrets.env.json";

/// Environment variable names bound to Secret Manager secrets at deploy time.
///
/// Each name `N` is mounted as `N=N:latest`: the variable and the secret
/// share a name, and the latest secret version is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secrets(Vec<String>);

impl Secrets {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Load a JSON array of strings. Anything but a regular file at `path`
    /// yields an empty list.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no secrets file");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::SecretsLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        let names: Vec<String> =
            serde_json::from_str(&content).map_err(|e| crate::Error::SecretsParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::debug!(path = %path.display(), count = names.len(), "secrets list loaded");
        Ok(Self(names))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
