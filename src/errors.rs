use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwhError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error identified during solar water heater calculation: {0}")]
    FailureInCalculation(#[from] SwhCoreError),
    #[error("Uncaught error during solar water heater calculation: {0}")]
    PanicInCalculation(String),
    #[error("Error during postprocessing: {0}")]
    ErrorInPostprocessing(PostprocessingError),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct SwhCoreError {
    error: anyhow::Error,
}

impl SwhCoreError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct PostprocessingError {
    error: anyhow::Error,
}

impl PostprocessingError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
