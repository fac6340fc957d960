use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::Error;

/// What a constructor was handed, resolved once at the boundary.
///
/// `Error::new`, `Error::plain` and the wrap family accept
/// `impl Into<Origin>`, so callers pass an existing [`Error`], any foreign
/// error, or an arbitrary displayable value without naming this type:
///
/// ```
/// use errstack::{Error, Origin};
///
/// let a = Error::plain("disk full");
/// let b = Error::plain(std::io::Error::other("disk full"));
/// let c = Error::plain(Origin::display(&507));
/// assert_eq!(a.to_string(), b.to_string());
/// assert_eq!(c.to_string(), "507");
/// ```
#[derive(Clone)]
pub enum Origin {
    /// Already an [`Error`]; moved (or, via `From<&Error>`, deep-copied).
    Error(Error),
    /// A foreign error. Immutable, so shared rather than copied.
    Foreign(Arc<dyn StdError + Send + Sync>),
    /// Any other value, already rendered to text.
    Text(String),
}

impl Origin {
    /// Wrap a foreign error.
    pub fn foreign<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Origin::Foreign(Arc::new(error))
    }

    /// Render an arbitrary value with `Display`.
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        Origin::Text(value.to_string())
    }

    /// Render an arbitrary value with `Debug`.
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Origin::Text(format!("{:?}", value))
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Origin::Foreign(e) => f.debug_tuple("Foreign").field(&e.to_string()).finish(),
            Origin::Text(s) => f.debug_tuple("Text").field(s).finish(),
        }
    }
}

/// The text the value would contribute to a message chain.
impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Error(e) => fmt::Display::fmt(e, f),
            Origin::Foreign(e) => fmt::Display::fmt(e, f),
            Origin::Text(s) => f.write_str(s),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────

impl From<Error> for Origin {
    fn from(err: Error) -> Self {
        Origin::Error(err)
    }
}

impl From<&Error> for Origin {
    fn from(err: &Error) -> Self {
        Origin::Error(err.clone())
    }
}

impl From<io::Error> for Origin {
    fn from(err: io::Error) -> Self {
        Origin::foreign(err)
    }
}

impl From<fmt::Error> for Origin {
    fn from(err: fmt::Error) -> Self {
        Origin::foreign(err)
    }
}

impl From<serde_json::Error> for Origin {
    fn from(err: serde_json::Error) -> Self {
        Origin::foreign(err)
    }
}

impl From<Box<dyn StdError + Send + Sync>> for Origin {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        // Keep an errstack::Error intact when it arrives boxed.
        match err.downcast::<Error>() {
            Ok(err) => Origin::Error(*err),
            Err(err) => Origin::Foreign(Arc::from(err)),
        }
    }
}

impl From<Arc<dyn StdError + Send + Sync>> for Origin {
    fn from(err: Arc<dyn StdError + Send + Sync>) -> Self {
        Origin::Foreign(err)
    }
}

impl From<&str> for Origin {
    fn from(text: &str) -> Self {
        Origin::Text(text.to_owned())
    }
}

impl From<String> for Origin {
    fn from(text: String) -> Self {
        Origin::Text(text)
    }
}

impl From<fmt::Arguments<'_>> for Origin {
    fn from(args: fmt::Arguments<'_>) -> Self {
        Origin::Text(fmt::format(args))
    }
}
