//! gcloud invocations for cloudship: typed Cloud Build / Cloud Run requests,
//! the executor seam, the dry-run aware [`CommandRunner`], and the
//! [`DeployPipeline`] that sequences them.

pub mod executor;
pub mod gcloud;
pub mod pipeline;
pub mod request;
pub mod runner;

pub use executor::{GcloudExecutor, RealExecutor};
pub use gcloud::GcloudError;
pub use pipeline::{DeployPipeline, DeployPlan, PipelineError, PipelineOutcome, Stage, Step};
pub use request::{BuildRequest, DeployRequest, GcloudCommand, Rendered, TrafficRequest};
pub use runner::{CommandRunner, RunError, RunMode};
