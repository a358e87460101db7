//! Conversions from external infrastructure errors into domain errors.

use gapi_domain::GapiError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GapiError);

impl From<InfraError> for GapiError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GapiError> for InfraError {
    fn from(value: GapiError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoGapiError {
    fn into_gapi(self) -> GapiError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GapiError */
/* -------------------------------------------------------------------------- */

impl IntoGapiError for HttpError {
    fn into_gapi(self) -> GapiError {
        if self.is_timeout() {
            return GapiError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return GapiError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return GapiError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return GapiError::Network(format!("failed to read HTTP body: {self}"));
        }

        GapiError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_gapi())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → GapiError */
/* -------------------------------------------------------------------------- */

impl IntoGapiError for JsonError {
    fn into_gapi(self) -> GapiError {
        GapiError::Serialization(format!(
            "invalid JSON at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        Self(value.into_gapi())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → GapiError */
/* -------------------------------------------------------------------------- */

impl IntoGapiError for UrlError {
    fn into_gapi(self) -> GapiError {
        GapiError::InvalidInput(format!("invalid URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        Self(value.into_gapi())
    }
}

/// Shorthand for `map_err` chains: `.map_err(into_gapi)?`.
pub(crate) fn into_gapi<E>(err: E) -> GapiError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
