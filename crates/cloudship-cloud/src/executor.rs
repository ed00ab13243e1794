use crate::gcloud::GcloudError;

/// Default CLI invoked by [`RealExecutor`].
pub const GCLOUD: &str = "gcloud";

/// Abstraction over gcloud CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait GcloudExecutor: Send + Sync {
    /// Run a gcloud command with inherited stdio and return its exit code.
    ///
    /// A non-zero exit is not an error; only failing to run the command is.
    async fn exec_status(&self, args: &[String]) -> Result<i32, GcloudError>;

    /// Program name shown in transcripts.
    fn program(&self) -> &str {
        GCLOUD
    }
}

/// Real gcloud CLI executor.
pub struct RealExecutor {
    program: String,
}

impl RealExecutor {
    pub fn new() -> Self {
        Self::with_program(GCLOUD)
    }

    /// Run `program` in place of `gcloud` (a wrapper script, a pinned SDK path).
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_owned(),
        }
    }
}

impl Default for RealExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl GcloudExecutor for RealExecutor {
    async fn exec_status(&self, args: &[String]) -> Result<i32, GcloudError> {
        use std::process::Stdio;

        let status = tokio::process::Command::new(&self.program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| GcloudError::NotFound {
                program: self.program.clone(),
                source: e,
            })?;

        status.code().ok_or_else(|| GcloudError::Terminated {
            program: self.program.clone(),
            args: args.to_vec(),
        })
    }

    fn program(&self) -> &str {
        &self.program
    }
}
