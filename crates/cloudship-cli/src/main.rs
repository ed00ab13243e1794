mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cloudship_core::{DEFAULT_CONFIG_PATH, DEFAULT_SECRETS_PATH};

#[derive(Parser)]
#[command(
    name = "cloudship",
    about = "Build a container with Cloud Build and ship it to Cloud Run"
)]
#[command(version)]
struct Cli {
    /// Deploy configuration (JSON)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Env var names to bind to Secret Manager secrets (JSON array, optional)
    #[arg(long, global = true, default_value = DEFAULT_SECRETS_PATH)]
    secrets: PathBuf,
    /// Read unset environment variables from this dotenv file
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    /// Print commands instead of running them (overrides config)
    #[arg(long, global = true)]
    dry_run: bool,
    /// Print commands and exit codes around execution (overrides config)
    #[arg(long, global = true)]
    debug: bool,
    /// gcloud executable to invoke
    #[arg(long, global = true, default_value = cloudship_cloud::executor::GCLOUD)]
    gcloud: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the image, deploy it, and migrate traffic to the new revision
    Deploy,
    /// Submit the image build only
    Build,
    /// Migrate all traffic to the latest deployed revision
    Promote,
    /// Print every command a deploy would run, without running anything
    Plan,
    /// Print the version tag and image name for this environment
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let opts = commands::Options {
        config: cli.config,
        secrets: cli.secrets,
        env_file: cli.env_file,
        dry_run: cli.dry_run,
        debug: cli.debug,
        gcloud: cli.gcloud,
    };

    let code = match cli.command {
        Commands::Deploy => commands::deploy(&opts).await?,
        Commands::Build => commands::build(&opts).await?,
        Commands::Promote => commands::promote(&opts).await?,
        Commands::Plan => commands::plan(&opts).await?,
        Commands::Version => commands::version(&opts)?,
    };

    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
