//! # errstack: structured errors with stacks and metadata
//!
//! A drop-in error value carrying, on top of its message:
//!
//! - the **call stack** captured where the error was created (or first
//!   wrapped around a foreign error),
//! - a **metadata** overlay of key/value annotations,
//! - a **cause** chain, walkable with the usual `is` / `find` / `unwrap`
//!   helpers and rendered as `cause:message`.
//!
//! It serializes to `{"error": .., "stack": [..], "meta": {..}}`.
//!
//! ## Design
//!
//! Values are immutable by contract. `wrap`, `with_meta` and `with_stack`
//! return a new [`Error`] whose stack and metadata are copied from the
//! operand; nothing is shared between handles, so derivations from a common
//! ancestor are safe on any thread without locking.
//!
//! ## Quick Start
//!
//! ```rust
//! use errstack::{err, Error, ResultExt};
//!
//! fn open(path: &str) -> errstack::Result<std::fs::File> {
//!     std::fs::File::open(path).wrap_err_with(|| format!("opening {}", path))
//! }
//!
//! let e = open("/nonexistent").unwrap_err().with_meta([("retry", false)]);
//! assert!(e.to_string().ends_with(":opening /nonexistent"));
//!
//! let e = err!("quota exceeded").wrap("upload");
//! assert_eq!(e.to_string(), "quota exceeded:upload");
//! println!("{}", e.to_json().unwrap());
//! ```
//!
//! ## Absent errors
//!
//! The free functions [`plain`], [`new`], [`wrap`] and [`wrapf`] take an
//! `Option` and propagate `None`: wrapping nothing yields nothing.
//!
//! ## Feature Flags
//!
//! | Flag      | Effect |
//! |-----------|--------|
//! | `capture` | Walks the native stack on `new` / `with_stack` / foreign wraps (default) |

mod stack;
mod origin;
mod error;
#[macro_use]
mod macros;
mod ext;
pub mod chain;

// ── Public API ────────────────────────────────────────────────────

pub use stack::{Frame, STACK_BUFFER_SIZE};
pub use origin::Origin;
pub use error::{Error, Metadata};
pub use ext::ResultExt;
pub use chain::{chain, find, is, is_structural, render, unwrap, NIL_TEXT};

/// Convenience Result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// The free functions match instead of calling `Option::map`: a closure
// frame between the caller and the capture would be reported as frame 0.

/// [`Error::plain`] with `None` passed through.
pub fn plain<I: Into<Origin>>(input: Option<I>) -> Option<Error> {
    match input {
        Some(input) => Some(Error::plain(input)),
        None => None,
    }
}

/// [`Error::new`] with `None` passed through.
pub fn new<I: Into<Origin>>(input: Option<I>) -> Option<Error> {
    match input {
        Some(input) => Some(Error::new(input)),
        None => None,
    }
}

/// [`Error::caused_by`] with `None` passed through.
pub fn wrap<C: Into<Origin>>(cause: Option<C>, message: impl Into<String>) -> Option<Error> {
    match cause {
        Some(cause) => Some(Error::caused_by(cause, message)),
        None => None,
    }
}

/// Format the message, then [`wrap`].
///
/// ```
/// let e = errstack::wrapf(Some("EOF"), format_args!("reading {} bytes", 16));
/// assert_eq!(e.map(|e| e.to_string()).as_deref(), Some("EOF:reading 16 bytes"));
/// ```
pub fn wrapf<C: Into<Origin>>(cause: Option<C>, args: std::fmt::Arguments<'_>) -> Option<Error> {
    let message = std::fmt::format(args);
    wrap(cause, message)
}
