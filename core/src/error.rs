use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    #[error("invalid item collection: {0}")]
    Parse(String),

    #[error("reference item {0} not found in the item collection")]
    ItemNotFound(i64),

    #[error("failed to compute recommendations: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for RecommendError {
    fn from(err: serde_json::Error) -> Self {
        RecommendError::Parse(err.to_string())
    }
}
