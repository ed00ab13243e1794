mod build;
mod deploy;
mod promote;
mod version;

use std::io;
use std::path::PathBuf;

use cloudship_cloud::{
    CommandRunner, DeployPipeline, PipelineOutcome, RealExecutor, RunMode, Stage,
};
use cloudship_core::{DeployConfig, DeployEnv, ProcessEnv, Secrets};

pub use build::build;
pub use deploy::{deploy, plan};
pub use promote::promote;
pub use version::version;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Options {
    pub config: PathBuf,
    pub secrets: PathBuf,
    pub env_file: Option<PathBuf>,
    pub dry_run: bool,
    pub debug: bool,
    pub gcloud: String,
}

/// Everything a run reads up front: config, secrets list, environment.
pub(crate) struct Deployment {
    pub config: DeployConfig,
    pub secrets: Secrets,
    pub env: DeployEnv,
}

impl Deployment {
    pub fn load(opts: &Options) -> anyhow::Result<Self> {
        let config = DeployConfig::load(&opts.config)?.with_overrides(opts.dry_run, opts.debug);
        let secrets = Secrets::load(&opts.secrets)?;
        let env = match &opts.env_file {
            Some(path) => DeployEnv::resolve(&ProcessEnv::with_env_file(path)?),
            None => DeployEnv::resolve(&ProcessEnv::new()),
        };

        tracing::debug!(?env, secrets = secrets.len(), "deployment inputs resolved");
        Ok(Self {
            config,
            secrets,
            env,
        })
    }

    pub fn pipeline(&self, gcloud: &str) -> DeployPipeline<'_, RealExecutor, io::Stdout> {
        let runner = CommandRunner::with_executor(
            RealExecutor::with_program(gcloud),
            RunMode::from(&self.config),
            io::stdout(),
        );
        DeployPipeline::new(runner, &self.config, &self.secrets, &self.env)
    }
}

/// Report a failed step and map the outcome to the process exit code.
pub(crate) fn exit_code(outcome: &PipelineOutcome) -> i32 {
    if let Stage::Failed { step, exit_code } = outcome.stage {
        eprintln!("{step} step failed with exit code {exit_code}");
    }
    outcome.exit_code()
}
