use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to read secrets list from {path}")]
    SecretsLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse secrets list at {path} (expected a JSON array of strings)")]
    SecretsParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to read env file {path}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error(
        "no service account configured for environment '{environment}'; known: {}",
        format_known(known)
    )]
    NoServiceAccount {
        environment: String,
        known: Vec<String>,
    },

    #[error("GITHUB_REF is not set — a production build needs a git ref to tag the image")]
    MissingGitRef,
}

fn format_known(known: &[String]) -> String {
    if known.is_empty() {
        "(none)".to_owned()
    } else {
        known.join(", ")
    }
}
