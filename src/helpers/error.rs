//! Helpers to describe errors in logs and development error responses.

use std::error::Error as StdError;
use std::fmt::Write;
use std::iter::successors;

/// Describes an error along with every error in its [`source`](StdError::source) chain, one per
/// line, followed by its backtrace when one was captured (see [`backtrace_message`]).
///
/// ```
/// use pokedex::helpers::error::describe_error_chain;
///
/// let error = "forty-two".parse::<i64>().unwrap_err();
/// assert!(describe_error_chain(&error).starts_with("invalid digit found in string"));
/// ```
#[cfg(not(tarpaulin_include))]
pub fn describe_error_chain<E>(error: &E) -> String
where
    E: StdError,
{
    let mut chain = successors(Some(error as &dyn StdError), |&current| current.source());

    let mut message = chain.next().map(ToString::to_string).unwrap_or_default();
    for cause in chain {
        let _ = write!(message, "\ncaused by: {}", cause);
    }

    if let Some(backtrace) = backtrace_message(error) {
        let _ = write!(message, "\n\nBacktrace: {}", backtrace);
    }

    message
}

/// Returns the [`Backtrace`](std::backtrace::Backtrace) captured by an error, if any.
///
/// Needs a Nightly toolchain: the `backtrace_support` cfg is set by the build script.
#[cfg(not(tarpaulin_include))]
#[cfg(backtrace_support)]
pub fn backtrace_message<E>(error: &E) -> Option<String>
where
    E: StdError,
{
    std::error::request_ref::<std::backtrace::Backtrace>(error)
        .map(|backtrace| format!("{:#}", backtrace))
}

#[cfg(not(tarpaulin_include))]
#[cfg(not(backtrace_support))]
#[doc(hidden)]
pub fn backtrace_message<E>(_error: &E) -> Option<String>
where
    E: StdError,
{
    None
}
