use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("lower bound {lower} exceeds upper bound {upper}")]
    CrossedBounds { lower: String, upper: String },

    #[error("failed to install log subscriber: {message}")]
    LoggingInit { message: String },
}

impl Error {
    #[must_use]
    pub fn crossed(lower: impl std::fmt::Display, upper: impl std::fmt::Display) -> Self {
        Self::CrossedBounds {
            lower: lower.to_string(),
            upper: upper.to_string(),
        }
    }
}
