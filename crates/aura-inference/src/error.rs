use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("upstream API error: {0}")]
    Upstream(String),

    #[error("the provider declined to generate a reply")]
    ContentFiltered,
}
