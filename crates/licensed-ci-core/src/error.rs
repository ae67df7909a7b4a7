use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required input `{0}` is missing")]
    MissingInput(&'static str),

    #[error("environment variable `{0}` is not set")]
    MissingEnv(&'static str),

    #[error("current ref not available")]
    MissingRef,

    #[error("{0} does not reference a branch")]
    NotABranch(String),

    #[error("workflow input value \"{value}\" must be one of: {valid}")]
    UnknownWorkflow { value: String, valid: String },
}
