//! Logging glue.
//!
//! With the `tracing` feature the macros below are the `tracing` macros.
//! Without it they expand to nothing, so call sites never need their own
//! `#[cfg]`.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {debug, trace};

/// Install a JSON formatter on stdout, filtered by `RUST_LOG`.
///
/// Fails if a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> crate::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|err| crate::Error::LoggingInit {
            message: err.to_string(),
        })
}
