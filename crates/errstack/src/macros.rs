/// Construct an [`Error`](crate::Error) with the stack captured at the
/// call site.
///
/// # Forms
///
/// ```ignore
/// // Literal message:
/// err!("port already in use")
///
/// // Formatted message:
/// err!("port {} already in use", port)
///
/// // Any `Into<Origin>` expression (foreign error, String, Error):
/// err!(io_err)
/// ```
#[macro_export]
macro_rules! err {
    ($msg:literal $(,)?) => {
        $crate::Error::new(::std::format!($msg))
    };
    ($fmt:literal, $($arg:tt)+) => {
        $crate::Error::new(::std::format!($fmt, $($arg)+))
    };
    ($input:expr $(,)?) => {
        $crate::Error::new($input)
    };
}

/// Wrap a cause with a formatted message.
///
/// ```ignore
/// return Err(wrapf!(io_err, "reading {}", path.display()));
/// ```
#[macro_export]
macro_rules! wrapf {
    ($cause:expr, $fmt:literal $(, $($arg:tt)+)?) => {
        $crate::Error::caused_by($cause, ::std::format!($fmt $(, $($arg)+)?))
    };
}

/// Early-return with an [`Error`](crate::Error) if a condition is false.
///
/// ```ignore
/// ensure!(user_id > 0, "bad user id {}", user_id);
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)+) => {
        if !$cond {
            return ::std::result::Result::Err($crate::err!($($msg)+).into());
        }
    };
}
