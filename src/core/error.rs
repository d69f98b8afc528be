use thiserror::Error;

use crate::{core::render::RenderError, ports::adapter::AdapterError};

/// Failure while serving one request. Every variant becomes a 500.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl RequestError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RequestError::InvalidArgument(msg.into())
    }
}
