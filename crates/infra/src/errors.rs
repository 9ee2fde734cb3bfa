//! Conversions from external infrastructure errors into domain errors.

use calbridge_domain::CalbridgeError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CalbridgeError);

impl From<InfraError> for CalbridgeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CalbridgeError> for InfraError {
    fn from(value: CalbridgeError) -> Self {
        InfraError(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        let classified = if value.is_timeout() {
            CalbridgeError::Network(format!("request timed out: {value}"))
        } else if value.is_connect() {
            CalbridgeError::Network(format!("connection failed: {value}"))
        } else if value.is_decode() {
            CalbridgeError::InvalidInput(format!("failed to decode response: {value}"))
        } else {
            CalbridgeError::Network(value.to_string())
        };
        InfraError(classified)
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(CalbridgeError::Config(format!("invalid URL: {value}")))
    }
}
