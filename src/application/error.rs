use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{application::repos::StoreError, config::LoadError, infra::error::InfraError};

/// Diagnostic detail riding on an error response as an extension. The logging
/// middleware consumes it; clients only see the public message.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub chain: Vec<String>,
}

impl ErrorReport {
    pub fn capture(source: &'static str, error: &dyn StdError) -> Self {
        let mut chain = vec![error.to_string()];
        let mut cause = error.source();
        while let Some(inner) = cause {
            chain.push(inner.to_string());
            cause = inner.source();
        }
        Self { source, chain }
    }

    pub fn note(source: &'static str, detail: impl Into<String>) -> Self {
        Self {
            source,
            chain: vec![detail.into()],
        }
    }

    pub fn detail(&self) -> &str {
        self.chain
            .first()
            .map(String::as_str)
            .unwrap_or("no diagnostic available")
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// A terminal HTTP failure: status, fixed public text, private report.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            public_message,
            report: ErrorReport::note(source, detail),
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        Self {
            status,
            public_message,
            report: ErrorReport::capture(source, error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn public_message(&self) -> &'static str {
        self.public_message
    }

    pub fn report(&self) -> &ErrorReport {
        &self.report
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Failures that abort the binary before or after serving.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Usage(String),
}
