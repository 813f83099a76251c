use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("operator 'has' on key '{key}' needs a list value")]
    HasRequiresList { key: String },
}
