//! Errors of the data API seam.
//!
//! A [`GisfireError`] always means the answer could not be obtained or read.
//! A non-200 status is not an error: [`DataApi`](crate::DataApi) methods
//! report it as `Ok(None)`. Pipelines and the CLI wrap errors in `anyhow`
//! with context at their own boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GisfireError {
    /// Request never got an answer (connection refused, TLS, DNS).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A 200 answer whose body did not decode.
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type GisfireResult<T> = Result<T, GisfireError>;
