use std::fmt;
use std::io::{self, Write};

use cloudship_core::DeployConfig;

use crate::executor::{GcloudExecutor, RealExecutor};
use crate::gcloud::GcloudError;
use crate::request::GcloudCommand;

/// How commands are handled by a [`CommandRunner`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    /// Print commands, never execute them.
    pub dry_run: bool,
    /// Print each command before and its exit code after execution.
    pub debug: bool,
}

impl From<&DeployConfig> for RunMode {
    fn from(config: &DeployConfig) -> Self {
        Self {
            dry_run: config.dry_run,
            debug: config.debug,
        }
    }
}

/// Runs gcloud commands according to a [`RunMode`], writing the transcript
/// (dry-run command lines, debug banners) to `out`.
pub struct CommandRunner<E: GcloudExecutor = RealExecutor, W: Write = io::Stdout> {
    executor: E,
    mode: RunMode,
    out: W,
}

impl<E: GcloudExecutor, W: Write> CommandRunner<E, W> {
    pub fn with_executor(executor: E, mode: RunMode, out: W) -> Self {
        Self {
            executor,
            mode,
            out,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Write one line to the transcript.
    pub fn say(&mut self, line: impl fmt::Display) -> Result<(), RunError> {
        writeln!(self.out, "{line}").map_err(|e| RunError::Transcript { source: e })
    }

    /// Run `cmd` and return its exit code verbatim (`0` in dry-run mode).
    pub async fn run(&mut self, cmd: &GcloudCommand) -> Result<i32, RunError> {
        let shown = cmd.render(self.executor.program()).to_string();
        if self.mode.dry_run {
            self.say(&shown)?;
            return Ok(0);
        }

        if self.mode.debug {
            self.say(format_args!("Running command: {shown}"))?;
        }

        let code = self
            .executor
            .exec_status(cmd.args())
            .await
            .map_err(|e| RunError::Gcloud { source: e })?;
        tracing::debug!(cmd = %shown, code, "command finished");

        if self.mode.debug {
            self.say(format_args!(
                "Command execution completed with result value {code}"
            ))?;
        }

        Ok(code)
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to run gcloud")]
    Gcloud { source: GcloudError },

    #[error("failed to write command transcript")]
    Transcript { source: io::Error },
}
