use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain;
use crate::origin::Origin;
use crate::stack::{self, Frame};

/// Per-error key/value annotations.
pub type Metadata = BTreeMap<String, Value>;

/// Structured error value: message, optional cause, captured stack,
/// metadata.
///
/// Every derivation (`wrap`, `with_meta`, `with_stack`) produces a new,
/// independently owned value. Stack and metadata are copied from the
/// operand, never shared, so no two handles can observe each other's
/// changes:
///
/// ```
/// use errstack::Error;
///
/// let e1 = Error::new("read failed").with_meta([("attempt", 1)]);
/// let e2 = e1.with_meta([("path", "/etc/app.toml")]);
/// assert_eq!(e1.meta().len(), 1);
/// assert_eq!(e2.meta().len(), 2);
/// ```
///
/// Rendering is `cause + ":" + message`, recursively:
///
/// ```
/// use errstack::Error;
///
/// let err = Error::new("foo").wrap("EOF").wrap("water buffalo");
/// assert_eq!(err.to_string(), "foo:EOF:water buffalo");
/// ```
#[derive(Clone)]
pub struct Error {
    message: String,
    cause: Option<Cause>,
    stack: Vec<Frame>,
    meta: Metadata,
}

#[derive(Clone)]
enum Cause {
    Stacked(Box<Error>),
    Foreign(Arc<dyn StdError + Send + Sync>),
}

impl Cause {
    fn as_std(&self) -> &(dyn StdError + 'static) {
        match self {
            Cause::Stacked(err) => &**err,
            Cause::Foreign(err) => &**err,
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Stacked(err) => fmt::Display::fmt(err, f),
            Cause::Foreign(err) => fmt::Display::fmt(err, f),
        }
    }
}

// ── Constructors ──────────────────────────────────────────────────

impl Error {
    fn bare(message: String) -> Self {
        Self {
            message,
            cause: None,
            stack: Vec::new(),
            meta: Metadata::new(),
        }
    }

    /// Build an error without walking the stack.
    ///
    /// An existing [`Error`] comes back as is, stack and metadata included
    /// (pass `&err` to get a deep copy). A foreign error contributes its
    /// text; any other value its rendered form.
    pub fn plain(input: impl Into<Origin>) -> Self {
        match input.into() {
            Origin::Error(err) => err,
            Origin::Foreign(err) => Self::bare(err.to_string()),
            Origin::Text(text) => Self::bare(text),
        }
    }

    /// Build an error and capture the caller's stack.
    ///
    /// An existing [`Error`] keeps the stack it was created with.
    pub fn new(input: impl Into<Origin>) -> Self {
        match input.into() {
            Origin::Error(err) => err,
            Origin::Foreign(err) => Self {
                stack: stack::capture(),
                ..Self::bare(err.to_string())
            },
            Origin::Text(text) => Self {
                stack: stack::capture(),
                ..Self::bare(text)
            },
        }
    }

    /// Add context on top of this error.
    ///
    /// The result inherits a copy of this error's stack and metadata, so
    /// the innermost call site stays the one reported.
    pub fn wrap(self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: self.stack.clone(),
            meta: self.meta.clone(),
            cause: Some(Cause::Stacked(Box::new(self))),
        }
    }

    /// Wrap any cause with a message.
    ///
    /// Errors from this crate go through [`Error::wrap`]. Foreign errors
    /// have no stack to inherit, so one is captured here; a plain value is
    /// first turned into a stackless cause.
    pub fn caused_by(cause: impl Into<Origin>, message: impl Into<String>) -> Self {
        match cause.into() {
            Origin::Error(err) => err.wrap(message),
            Origin::Foreign(err) => Self {
                cause: Some(Cause::Foreign(err)),
                stack: stack::capture(),
                ..Self::bare(message.into())
            },
            Origin::Text(text) => Self {
                cause: Some(Cause::Stacked(Box::new(Self::bare(text)))),
                stack: stack::capture(),
                ..Self::bare(message.into())
            },
        }
    }
}

// ── Derivations ───────────────────────────────────────────────────

impl Error {
    /// A copy of this error with `entries` laid over its metadata.
    ///
    /// Later entries win per key. `self` is left untouched.
    pub fn with_meta<I, K, V>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.clone().extend_meta(entries)
    }

    /// Single-entry form of [`Error::with_meta`].
    pub fn with_meta_entry(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_meta([(key, value)])
    }

    /// A copy of this error with a stack captured at the caller.
    pub fn with_stack(&self) -> Self {
        Self {
            stack: stack::capture(),
            ..self.clone()
        }
    }

    pub(crate) fn extend_meta<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.meta
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl Error {
    /// This error's own message, without the cause prefix.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn stack(&self) -> &[Frame] {
        &self.stack
    }

    #[inline]
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    /// The immediate cause, if any.
    pub fn unwrap_cause(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(Cause::as_std)
    }

    /// The innermost error of the chain (`self` when there is no cause).
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    /// Attempt to downcast a link of the cause chain to a concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        chain::find(self)
    }
}

// ── Matching ──────────────────────────────────────────────────────

impl Error {
    /// Whether `target` is this error or one of its causes.
    ///
    /// A link matches when it is the very same object as `target`, or when
    /// it is an [`Error`] whose own message or rendered text equals
    /// `target`'s text. Text matching keeps string-based comparisons
    /// working, at the price of false positives between unrelated errors
    /// that render alike; [`Error::is_structural`] drops it.
    ///
    /// ```
    /// use errstack::Error;
    ///
    /// let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
    /// let err = Error::new("foobar").wrap(eof.to_string()).wrap("water buffalo");
    /// assert!(err.is(&eof));
    /// ```
    pub fn is(&self, target: &(dyn StdError + 'static)) -> bool {
        chain::is(self, target)
    }

    /// Identity-only form of [`Error::is`].
    pub fn is_structural(&self, target: &(dyn StdError + 'static)) -> bool {
        chain::is_structural(self, target)
    }

    pub(crate) fn matches_text(&self, text: &str) -> bool {
        if self.message == text {
            return true;
        }
        // Rendered form only differs when there is a cause.
        self.cause.is_some() && self.to_string() == text
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.unwrap_cause()
    }
}

// ── Display ───────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cause) = &self.cause {
            write!(f, "{}:", cause)?;
        }
        f.write_str(&self.message)
    }
}

// ── Debug ─────────────────────────────────────────────────────────

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Error");
        d.field("message", &self.message);

        if let Some(cause) = &self.cause {
            d.field("cause", &format_args!("{}", cause));
        }
        if !self.stack.is_empty() {
            d.field("stack", &self.stack);
        }
        if !self.meta.is_empty() {
            d.field("meta", &self.meta);
        }

        d.finish()
    }
}

// ── Conversions ───────────────────────────────────────────────────

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}

impl From<Box<dyn StdError + Send + Sync>> for Error {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        Self::new(err)
    }
}

// ── JSON ──────────────────────────────────────────────────────────

impl Serialize for Error {
    /// `{"error": <rendered>, "stack": [..], "meta": {..}}`; `stack` and
    /// `meta` are left out when empty.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 1 + usize::from(!self.stack.is_empty()) + usize::from(!self.meta.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("error", &self.to_string())?;
        if !self.stack.is_empty() {
            map.serialize_entry("stack", &self.stack)?;
        }
        if !self.meta.is_empty() {
            map.serialize_entry("meta", &self.meta)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct Wire {
    error: String,
    #[serde(default)]
    stack: Vec<Frame>,
    #[serde(default)]
    meta: Metadata,
}

impl<'de> Deserialize<'de> for Error {
    /// The cause chain is not transported: the decoded error carries the
    /// rendered text as its own message and no cause.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Wire::deserialize(deserializer)?;
        Ok(Self {
            message: wire.error,
            cause: None,
            stack: wire.stack,
            meta: wire.meta,
        })
    }
}

impl Error {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
