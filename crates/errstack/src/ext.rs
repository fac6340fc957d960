use serde_json::Value;

use crate::{Error, Origin};

/// Extension trait for attaching `errstack` context to any `Result`.
///
/// `Ok` values pass through untouched, so wrapping a success is a no-op.
///
/// ```
/// use errstack::ResultExt;
///
/// fn read_config() -> errstack::Result<String> {
///     let text = std::fs::read_to_string("/nonexistent/app.toml")
///         .wrap_err("reading config")?;
///     Ok(text)
/// }
///
/// let err = read_config().unwrap_err();
/// assert!(err.to_string().ends_with(":reading config"));
/// ```
pub trait ResultExt<T> {
    /// Wrap the error with a message.
    fn wrap_err<M>(self, message: M) -> Result<T, Error>
    where
        M: Into<String>;

    /// Wrap the error with a lazily built message.
    fn wrap_err_with<M, F>(self, message: F) -> Result<T, Error>
    where
        M: Into<String>,
        F: FnOnce() -> M;

    /// Convert the error and lay `entries` over its metadata.
    fn with_meta_err<I, K, V>(self, entries: I) -> Result<T, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Origin>,
{
    fn wrap_err<M>(self, message: M) -> Result<T, Error>
    where
        M: Into<String>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(Error::caused_by(err, message)),
        }
    }

    fn wrap_err_with<M, F>(self, message: F) -> Result<T, Error>
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => {
                let message = message();
                Err(Error::caused_by(err, message))
            }
        }
    }

    fn with_meta_err<I, K, V>(self, entries: I) -> Result<T, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(Error::new(err).extend_meta(entries)),
        }
    }
}
