use http::StatusCode;
use serde::Serialize;

use crate::infer::openai::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    BadRequest(Box<str>),
    #[error("{message}")]
    Remote { status: StatusCode, message: Box<str> },
    #[error("Request failed: {0}")]
    RequestFailed(Box<str>),
    #[error("An error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Remote { status, .. } => *status,
            Error::RequestFailed(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub trait CoercibleResult<T> {
    fn into_service_result(self) -> Result<T>;
}

impl<T, E> CoercibleResult<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_service_result(self) -> Result<T> {
        self.map_err(|e| anyhow::Error::from(e).into())
    }
}

impl From<ApiError> for Error {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::RequestFailed(error) => {
                tracing::error!("LLM request failed: {}", error_chain(&error));
                Error::RequestFailed(error_chain(&error).into())
            }
            ApiError::ErrorResponse { status, message } => {
                tracing::warn!("LLM endpoint rejected the request with {}", status);
                Error::Remote { status, message }
            }
            ApiError::ParseFailed(error) => {
                tracing::error!("LLM reply could not be parsed: {}", error);
                Error::Internal(error.into())
            }
        }
    }
}

/// Renders an error together with every `source()` beneath it.
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        // hyper and reqwest sometimes repeat the inner message verbatim
        if !chain.ends_with(&message) {
            chain.push_str(": ");
            chain.push_str(&message);
        }
        source = cause.source();
    }
    chain
}

#[derive(Debug, Serialize)]
pub struct HttpErrorBody {
    pub error: Box<str>,
}

impl From<&Error> for HttpErrorBody {
    fn from(error: &Error) -> Self {
        HttpErrorBody {
            error: error.to_string().into(),
        }
    }
}

#[cfg(feature = "server-http2")]
impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        (self.status(), axum::Json(HttpErrorBody::from(&self))).into_response()
    }
}
