use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
    InvocationErrorKind,
};

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Invocation(invocation_error_kind) => match invocation_error_kind {
                InvocationErrorKind::WebhookAuthentication => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response()
                }
                // Unsupported files are acknowledged with an outcome, not raised.
                InvocationErrorKind::InvalidEvent | InvocationErrorKind::UnsupportedFileType => {
                    (StatusCode::BAD_REQUEST, "BAD REQUEST").into_response()
                }
            },
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::MalformedTranscript => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY").into_response()
                }
                InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                    error!("Internal error while handling invocation: {:?}", self.0.source);
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::TranscriptionTimeout => {
                    (StatusCode::GATEWAY_TIMEOUT, "GATEWAY TIMEOUT").into_response()
                }
                _ => (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response(),
            },
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
