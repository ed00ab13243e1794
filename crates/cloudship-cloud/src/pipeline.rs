//! Build → deploy → traffic migration.

use std::io::Write;

use cloudship_core::{DeployConfig, DeployEnv, ImageName, Secrets, ServiceVersion};

use crate::executor::GcloudExecutor;
use crate::request::{BuildRequest, DeployRequest, TrafficRequest};
use crate::runner::{CommandRunner, RunError};

/// External step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Build,
    Deploy,
    Traffic,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Build => "build",
            Self::Deploy => "deploy",
            Self::Traffic => "traffic migration",
        })
    }
}

/// Progress of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing resolved yet; a run that fails to plan stays here.
    Init,
    /// Every request resolved; nothing executed yet.
    Configured,
    Built,
    Deployed,
    TrafficShifted,
    /// `step` exited with a non-zero `exit_code`; later steps were skipped.
    Failed { step: Step, exit_code: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// Last stage reached.
    pub stage: Stage,
    /// Image built or deployed, if the run involved one.
    pub image: Option<ImageName>,
}

impl PipelineOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self.stage, Stage::Failed { .. })
    }

    /// Exit code of the failed step, `0` otherwise.
    pub fn exit_code(&self) -> i32 {
        match self.stage {
            Stage::Failed { exit_code, .. } => exit_code,
            _ => 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] cloudship_core::Error),

    #[error(transparent)]
    Run(#[from] RunError),
}

/// Every request a full deploy issues, resolved before anything runs.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub image: ImageName,
    pub build: BuildRequest,
    pub deploy: DeployRequest,
    pub traffic: TrafficRequest,
}

/// Sequences the gcloud steps of a deploy over a [`CommandRunner`].
pub struct DeployPipeline<'a, E: GcloudExecutor, W: Write> {
    runner: CommandRunner<E, W>,
    config: &'a DeployConfig,
    secrets: &'a Secrets,
    env: &'a DeployEnv,
    stage: Stage,
}

impl<'a, E: GcloudExecutor, W: Write> DeployPipeline<'a, E, W> {
    pub fn new(
        runner: CommandRunner<E, W>,
        config: &'a DeployConfig,
        secrets: &'a Secrets,
        env: &'a DeployEnv,
    ) -> Self {
        Self {
            runner,
            config,
            secrets,
            env,
            stage: Stage::Init,
        }
    }

    /// Stage reached by the latest run.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn image_name(&self, version: ServiceVersion) -> ImageName {
        ImageName::new(
            &self.config.registry,
            &self.env.project_id,
            &self.env.service_name,
            version,
        )
    }

    pub fn build_request(&self, image: &ImageName) -> BuildRequest {
        BuildRequest {
            config_path: self.config.build_config.clone(),
            git_username: self.env.git_username.clone(),
            git_token: self.env.git_token.clone(),
            image: image.to_string(),
        }
    }

    /// Fails when no service account is configured for the environment.
    pub fn deploy_request(&self, image: &ImageName) -> Result<DeployRequest, PipelineError> {
        let environment = &self.env.environment;
        Ok(DeployRequest {
            service: self.env.service_name.clone(),
            image: image.to_string(),
            env_vars_file: self
                .config
                .env_vars_file(environment)
                .to_string_lossy()
                .into_owned(),
            platform: self.config.platform.clone(),
            region: self.env.region.clone(),
            service_account: self.config.service_account(environment)?.to_owned(),
            secrets: self.secrets.names().to_vec(),
        })
    }

    pub fn traffic_request(&self) -> TrafficRequest {
        TrafficRequest {
            service: self.env.service_name.clone(),
            platform: self.config.platform.clone(),
            region: self.env.region.clone(),
        }
    }

    pub fn plan(&self, version: ServiceVersion) -> Result<DeployPlan, PipelineError> {
        let image = self.image_name(version);
        Ok(DeployPlan {
            build: self.build_request(&image),
            deploy: self.deploy_request(&image)?,
            traffic: self.traffic_request(),
            image,
        })
    }

    /// Full run: build, deploy, and, only if the deploy exited `0`, shift
    /// all traffic to the new revision. A failed build stops the run too.
    pub async fn run(&mut self, version: ServiceVersion) -> Result<PipelineOutcome, PipelineError> {
        self.stage = Stage::Init;
        self.announce()?;
        let plan = self.plan(version)?;
        self.report_inputs(&plan.image)?;
        self.stage = Stage::Configured;
        let image = Some(plan.image.clone());

        tracing::info!(image = %plan.image, "submitting build");
        let code = self.runner.run(&plan.build.to_command()).await?;
        if code != 0 {
            return Ok(self.fail(Step::Build, code, image));
        }
        self.stage = Stage::Built;

        tracing::info!(service = %plan.deploy.service, region = %plan.deploy.region, "deploying");
        let code = self.runner.run(&plan.deploy.to_command()).await?;
        if code != 0 {
            return Ok(self.fail(Step::Deploy, code, image));
        }
        self.stage = Stage::Deployed;

        tracing::info!(service = %plan.traffic.service, "migrating traffic to latest revision");
        let code = self.runner.run(&plan.traffic.to_command()).await?;
        if code != 0 {
            return Ok(self.fail(Step::Traffic, code, image));
        }

        self.finish(Stage::TrafficShifted, image)
    }

    /// Build step alone.
    pub async fn build_only(
        &mut self,
        version: ServiceVersion,
    ) -> Result<PipelineOutcome, PipelineError> {
        self.stage = Stage::Init;
        self.announce()?;
        let image = self.image_name(version);
        self.report_inputs(&image)?;
        let request = self.build_request(&image);
        self.stage = Stage::Configured;

        tracing::info!("submitting build");
        let code = self.runner.run(&request.to_command()).await?;
        if code != 0 {
            return Ok(self.fail(Step::Build, code, Some(image)));
        }

        self.finish(Stage::Built, Some(image))
    }

    /// Traffic migration alone, for a revision deployed earlier.
    pub async fn promote(&mut self) -> Result<PipelineOutcome, PipelineError> {
        self.stage = Stage::Init;
        self.announce()?;
        let cmd = self.traffic_request().to_command();
        self.stage = Stage::Configured;

        tracing::info!(service = %self.env.service_name, "migrating traffic to latest revision");
        let code = self.runner.run(&cmd).await?;
        if code != 0 {
            return Ok(self.fail(Step::Traffic, code, None));
        }

        self.finish(Stage::TrafficShifted, None)
    }

    pub fn into_runner(self) -> CommandRunner<E, W> {
        self.runner
    }

    fn announce(&mut self) -> Result<(), RunError> {
        let mode = self.runner.mode();
        if mode.dry_run {
            self.runner.say("Running in dry mode")?;
        } else if mode.debug {
            self.runner.say("Running in debug mode")?;
        }
        Ok(())
    }

    fn report_inputs(&mut self, image: &ImageName) -> Result<(), RunError> {
        if self.runner.mode().debug {
            self.runner
                .say(format_args!("Secrets Obtained: {:?}", self.secrets.names()))?;
            self.runner.say(format_args!("Docker image name: {image}"))?;
        }
        Ok(())
    }

    fn finish(
        &mut self,
        stage: Stage,
        image: Option<ImageName>,
    ) -> Result<PipelineOutcome, PipelineError> {
        self.stage = stage;
        if self.runner.mode().debug {
            self.runner.say("Script finished")?;
        }
        Ok(PipelineOutcome { stage, image })
    }

    fn fail(&mut self, step: Step, exit_code: i32, image: Option<ImageName>) -> PipelineOutcome {
        tracing::warn!(%step, exit_code, "step failed, stopping");
        self.stage = Stage::Failed { step, exit_code };
        PipelineOutcome {
            stage: self.stage,
            image,
        }
    }
}
