use std::fmt;

use chrono::{DateTime, Utc};

use crate::env::DeployEnv;

/// Tag attached to the container image of a deploy.
///
/// Production deploys are tagged with the git ref name so the image can be
/// traced back to a release; everything else gets the Unix time of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceVersion {
    /// Last segment of `GITHUB_REF` (`refs/tags/v1.2.3` → `v1.2.3`).
    Release(String),
    /// Seconds since the Unix epoch.
    Timestamp(i64),
}

impl ServiceVersion {
    /// Resolve using the current time.
    pub fn current(env: &DeployEnv) -> crate::Result<Self> {
        Self::resolve(env, Utc::now())
    }

    pub fn resolve(env: &DeployEnv, now: DateTime<Utc>) -> crate::Result<Self> {
        if env.is_production() {
            let git_ref = env.git_ref.as_deref().ok_or(crate::Error::MissingGitRef)?;
            return Ok(Self::Release(ref_name(git_ref).to_owned()));
        }

        Ok(Self::Timestamp(now.timestamp()))
    }
}

impl fmt::Display for ServiceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release(name) => f.write_str(name),
            Self::Timestamp(secs) => write!(f, "{secs}"),
        }
    }
}

/// Last `/`-separated segment of a git ref.
pub fn ref_name(git_ref: &str) -> &str {
    git_ref.rsplit('/').next().unwrap_or(git_ref)
}
