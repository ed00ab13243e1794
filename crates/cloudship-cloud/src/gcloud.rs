#[derive(Debug, thiserror::Error)]
pub enum GcloudError {
    #[error("{program} not found — install: https://cloud.google.com/sdk/docs/install")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} was terminated by a signal: {args:?}")]
    Terminated { program: String, args: Vec<String> },
}
