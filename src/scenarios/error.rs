//! Simulated domain failures and their translation to responses.

use std::error::Error as _;
use std::io;

use axum::http::StatusCode;
use axum::response::Response;
use thiserror::Error;

use crate::http::correlation::CorrelationId;
use crate::http::response::ErrorBody;

/// A request parameter with a value the endpoint cannot accept.
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {name}")]
pub struct InvalidParameter {
    pub name: &'static str,
    pub value: String,
}

/// Failures produced on purpose by the error scenarios.
///
/// Never escapes a handler: [`ScenarioError::into_logged_response`] logs it
/// and turns it into a response without internal details.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Request parameters failed validation.
    #[error("Simulated validation error")]
    Validation {
        #[source]
        source: InvalidParameter,
    },

    /// A dependency the service cannot run without is gone.
    #[error("Simulated critical system failure")]
    Critical {
        #[source]
        source: io::Error,
    },
}

impl ScenarioError {
    /// Stable name reported as `error_type`.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScenarioError::Validation { .. } => "ValidationError",
            ScenarioError::Critical { .. } => "CriticalSystemFailure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ScenarioError::Validation { .. } => StatusCode::BAD_REQUEST,
            ScenarioError::Critical { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Display of this error followed by each source, `: `-separated.
    pub fn error_chain(&self) -> String {
        let mut chain = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            chain.push_str(": ");
            chain.push_str(&cause.to_string());
            source = cause.source();
        }
        chain
    }

    fn body(&self) -> ErrorBody {
        match self {
            ScenarioError::Validation { .. } => {
                ErrorBody::new("Validation Error", "Invalid request parameters")
            }
            ScenarioError::Critical { .. } => ErrorBody::new(
                "Critical System Failure",
                "The system encountered a critical failure",
            ),
        }
        .timestamped()
    }

    /// Log this failure for `endpoint` and build the client response.
    pub fn into_logged_response(self, correlation_id: CorrelationId, endpoint: &'static str) -> Response {
        let error_type = self.type_name();
        let error_chain = self.error_chain();

        match &self {
            ScenarioError::Validation { .. } => tracing::error!(
                correlation_id = %correlation_id,
                error_type,
                error_message = %self,
                endpoint,
                error_chain = %error_chain,
                "Validation error occurred"
            ),
            ScenarioError::Critical { .. } => crate::critical!(
                correlation_id = %correlation_id,
                error_type,
                error_message = %self,
                endpoint,
                error_chain = %error_chain,
                "Critical system failure occurred"
            ),
        }

        self.body().into_response_with(self.status())
    }
}
