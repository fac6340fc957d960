//! Call-stack capture.
//!
//! A captured stack is a plain `Vec<Frame>`, leaf-most call first. It is
//! taken once when an error is created (or wrapped around a foreign error)
//! and afterwards only ever cloned or replaced wholesale.
//!
//! ```text
//!  backtrace::trace ─┐
//!  stack::capture    │  skipped: capture machinery and this crate's
//!  Error::new        │  constructors / wrappers (leading frames only)
//!  errstack::new    ─┘
//!  app::load_config  ◄── frame 0 (the caller)
//!  app::main
//!  core::ops::function::FnOnce::call_once ── dropped: runtime plumbing
//!  std::sys::backtrace::__rust_begin_short_backtrace ── walk stops here
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of frames retained per capture.
pub const STACK_BUFFER_SIZE: usize = 100;

/// One captured call-stack entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub line: u32,
}

fn is_zero(line: &u32) -> bool {
    *line == 0
}

impl Frame {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}:{} {}()\"", self.file, self.line, self.function)
    }
}

// ── Frame filtering ───────────────────────────────────────────────

const CRATE_PATH: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
const CRATE_SELF_TYPE: &str = concat!("<", env!("CARGO_CRATE_NAME"), "::");
const CRATE_TRAIT_IMPL: &str = concat!(" as ", env!("CARGO_CRATE_NAME"), "::");

/// Paths (relative to this crate) of every function that captures on
/// behalf of a caller.
const INTERNAL_PATHS: &[&str] = &[
    "stack::capture",
    "error::Error::new",
    "error::Error::with_stack",
    "error::Error::wrap",
    "error::Error::caused_by",
    "new",
    "wrap",
    "wrapf",
];

/// Foreign frames that can sit between a caller and this crate.
const INTERNAL_FOREIGN: &[&str] = &["backtrace::", "_Unwind_"];

/// `?` converting into this crate's error.
const TRY_CONVERSION: &str = " as core::ops::try_trait::FromResidual";

/// Leading frames of sibling crates that build errors on a caller's behalf.
const SIBLING_PATHS: &[&str] = &["errstack_await::"];

/// Where user code is entered from the runtime: the walk stops here.
const RUNTIME_BOUNDARY: &[&str] = &["__rust_begin_short_backtrace", "std::rt::lang_start"];

/// Runtime plumbing paths, matched with any leading `<` / `&` stripped.
const RUNTIME_PATHS: &[&str] = &[
    "std::rt::",
    "std::sys::",
    "std::panicking::",
    "std::panic::catch_unwind",
    "std::thread::",
    "core::panic::unwind_safe::",
    "core::ops::function::FnOnce::call_once",
    "alloc::boxed::Box<F,A> as core::ops::function::FnOnce",
    "alloc::boxed::Box<dyn core::ops::function::FnOnce",
    "dyn core::ops::function::Fn",
];

/// C runtime and libc thread entry symbols.
const RUNTIME_SYMBOLS: &[&str] = &["__libc_start", "_start", "start_thread", "__clone", "clone"];

fn is_internal(function: &str) -> bool {
    if INTERNAL_FOREIGN.iter().any(|p| function.starts_with(p)) {
        return true;
    }
    if function.starts_with(CRATE_SELF_TYPE)
        || function.contains(CRATE_TRAIT_IMPL)
        || function.contains(TRY_CONVERSION)
    {
        return true;
    }
    if is_sibling(function) {
        return true;
    }
    match function.strip_prefix(CRATE_PATH) {
        Some(rest) => INTERNAL_PATHS.iter().any(|p| rest.starts_with(p)),
        None => false,
    }
}

fn is_sibling(function: &str) -> bool {
    let path = function.trim_start_matches('<');
    !path.contains("::tests::") && SIBLING_PATHS.iter().any(|p| path.starts_with(p))
}

fn is_runtime_boundary(function: &str) -> bool {
    RUNTIME_BOUNDARY.iter().any(|p| function.contains(p))
}

fn is_runtime_entry(function: &str) -> bool {
    if function == "main" || RUNTIME_SYMBOLS.iter().any(|p| function.starts_with(p)) {
        return true;
    }
    let path = function.trim_start_matches(['<', '&']);
    RUNTIME_PATHS.iter().any(|p| path.starts_with(p))
}

// ── Capture ───────────────────────────────────────────────────────

/// Walk the current call stack, starting from the first frame outside
/// this crate's capture path.
///
/// Symbols that cannot be resolved (stripped binaries) are dropped, so a
/// release build without debug info may return an empty stack.
#[cfg(feature = "capture")]
#[inline(never)]
pub(crate) fn capture() -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut leading = true;
    let mut entered = false;

    backtrace::trace(|raw| {
        // Inlined calls resolve to several symbols for one raw frame.
        backtrace::resolve_frame(raw, |symbol| {
            if entered || frames.len() >= STACK_BUFFER_SIZE {
                return;
            }
            let Some(name) = symbol.name() else {
                return;
            };
            // `{:#}` drops the trailing `::h<hash>`.
            let function = format!("{:#}", name);
            if leading {
                if is_internal(&function) {
                    return;
                }
                leading = false;
            }
            if is_runtime_boundary(&function) {
                entered = true;
                return;
            }
            if is_runtime_entry(&function) {
                return;
            }
            frames.push(Frame {
                function,
                file: symbol
                    .filename()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                line: symbol.lineno().unwrap_or(0),
            });
        });
        !entered && frames.len() < STACK_BUFFER_SIZE
    });

    tracing::trace!(frames = frames.len(), "captured stack");
    frames
}

#[cfg(not(feature = "capture"))]
#[inline(always)]
pub(crate) fn capture() -> Vec<Frame> {
    Vec::new()
}
