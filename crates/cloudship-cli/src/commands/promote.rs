use super::{Deployment, Options};

pub async fn promote(opts: &Options) -> anyhow::Result<i32> {
    let deployment = Deployment::load(opts)?;

    let mut pipeline = deployment.pipeline(&opts.gcloud);
    let outcome = pipeline.promote().await?;

    Ok(super::exit_code(&outcome))
}
