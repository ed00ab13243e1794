use std::fmt;

use crate::version::ServiceVersion;

/// Fully qualified container image reference: `registry/project/service:version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageName {
    pub registry: String,
    pub project_id: String,
    pub service: String,
    pub version: ServiceVersion,
}

impl ImageName {
    pub fn new(registry: &str, project_id: &str, service: &str, version: ServiceVersion) -> Self {
        Self {
            registry: registry.to_owned(),
            project_id: project_id.to_owned(),
            service: service.to_owned(),
            version,
        }
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{registry}/{project}/{service}:{version}",
            registry = self.registry,
            project = self.project_id,
            service = self.service,
            version = self.version,
        )
    }
}
