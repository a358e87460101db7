//! Infrastructure error handling

pub mod conversions;

pub use conversions::InfraError;
pub(crate) use conversions::into_gapi;
