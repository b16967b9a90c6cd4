pub type WarpmorphResult<T> = Result<T, WarpmorphError>;

#[derive(thiserror::Error, Debug)]
pub enum WarpmorphError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("degenerate geometry: {0}")]
    Geometry(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WarpmorphError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// `true` for errors raised before any frame work starts.
    pub fn is_pre_run(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Resource(_))
    }
}
