use cloudship_core::{ImageName, ServiceVersion};

use super::{Deployment, Options};

/// Print the version tag, then the full image name, one per line.
pub fn version(opts: &Options) -> anyhow::Result<i32> {
    let Deployment { config, env, .. } = Deployment::load(opts)?;
    let version = ServiceVersion::current(&env)?;

    println!("{version}");
    println!(
        "{}",
        ImageName::new(&config.registry, &env.project_id, &env.service_name, version)
    );
    Ok(0)
}
