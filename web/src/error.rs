use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::controller::Envelope;
use domain::error::Error as DomainError;

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl Error {
    /// HTTP status the envelope for `err` carries: 400 for caller mistakes, 500 otherwise.
    pub(crate) fn status_code(err: &DomainError) -> StatusCode {
        if err.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = Error::status_code(&self.0);
        if status == StatusCode::BAD_REQUEST {
            warn!("Rejected request: {}", self.0);
            Envelope::complete_with_status(status, self.0.to_string()).into_response()
        } else {
            error!("Request failed: {}", self.0);
            Envelope::complete_with_status(status, format!("server error: {}", self.0))
                .into_response()
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
