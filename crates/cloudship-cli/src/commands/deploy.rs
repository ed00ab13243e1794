use cloudship_core::ServiceVersion;

use super::{Deployment, Options};

/// Execute the full deploy pipeline: build → deploy → traffic migration.
pub async fn deploy(opts: &Options) -> anyhow::Result<i32> {
    let deployment = Deployment::load(opts)?;
    let version = ServiceVersion::current(&deployment.env)?;

    let mut pipeline = deployment.pipeline(&opts.gcloud);
    let outcome = pipeline.run(version).await?;

    Ok(super::exit_code(&outcome))
}

/// Print the commands of a full deploy without running any of them.
pub async fn plan(opts: &Options) -> anyhow::Result<i32> {
    let opts = Options {
        dry_run: true,
        ..opts.clone()
    };
    deploy(&opts).await
}
