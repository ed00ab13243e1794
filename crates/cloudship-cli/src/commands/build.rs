use cloudship_core::ServiceVersion;

use super::{Deployment, Options};

pub async fn build(opts: &Options) -> anyhow::Result<i32> {
    let deployment = Deployment::load(opts)?;
    let version = ServiceVersion::current(&deployment.env)?;

    let mut pipeline = deployment.pipeline(&opts.gcloud);
    let outcome = pipeline.build_only(version).await?;

    Ok(super::exit_code(&outcome))
}
