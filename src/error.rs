//! Unified error types.
//!
//! Two failure classes, deliberately kept apart:
//!
//! - [`ConfigError`] — raised during startup discovery only. Fatal: a bad
//!   route declaration aborts startup before the server accepts a single
//!   request. Never produced during dispatch.
//! - [`Error`] — the top-level type returned by fallible server operations,
//!   wrapping either a `ConfigError` or an infrastructure I/O failure.
//!
//! A request that matches no route is not an error at all; it is the
//! [`Outcome::NotFound`](crate::Outcome::NotFound) dispatch value.

use std::fmt;

use crate::method::Method;

/// A fatal route-configuration problem, detected during discovery.
#[derive(Debug)]
pub enum ConfigError {
    /// The same (method, template) pair was declared twice. Overlapping
    /// templates are fine; exact duplicates are rejected rather than
    /// silently overwritten.
    DuplicateRoute { method: Method, template: String },
    /// A path template failed to compile.
    MalformedTemplate { template: String, reason: String },
    /// Route metadata named a middleware absent from the registry.
    UnknownMiddleware { name: String },
    /// Route metadata named an operation the controller cannot bind.
    UnknownOperation { controller: &'static str, name: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRoute { method, template } => {
                write!(f, "duplicate route: {method} {template}")
            }
            Self::MalformedTemplate { template, reason } => {
                write!(f, "malformed template `{template}`: {reason}")
            }
            Self::UnknownMiddleware { name } => {
                write!(f, "unknown middleware `{name}`")
            }
            Self::UnknownOperation { controller, name } => {
                write!(f, "controller `{controller}` has no operation `{name}`")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// The error type returned by strada's fallible operations.
///
/// Application-level outcomes (404, 403, etc.) are expressed as
/// [`Response`](crate::Response) values, not as `Error`s.
#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
