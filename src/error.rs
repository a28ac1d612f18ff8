use std::{borrow::Cow, time::Duration};

use serde::{Deserialize, Serialize};

/// Everything that can go wrong while running a suite, a test or a hook.
///
/// Errors never escape a run. They are collected into the `errors` list of the
/// failing testable and show up in the result graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[non_exhaustive]
pub enum Error {
    /// A body returned an error or panicked.
    #[error("{message}")]
    Body { message: String },

    /// The deadline elapsed before the body settled.
    #[error("Timed out after {timeout_ms}ms")]
    Timeout {
        #[serde(rename = "timeoutMs")]
        timeout_ms: u64,
    },

    /// The explicit completion callback was invoked more than once.
    #[error("done already called")]
    DoubleDone,

    /// A before or after hook failed; attributed to the hook's owner.
    #[error("hook {hook:?} failed: {cause}")]
    Hook { hook: String, cause: Box<Error> },
}

/// Discriminant of [`Error`], handy for assertions and renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Body,
    Timeout,
    DoubleDone,
    Hook,
}

impl Error {
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body {
            message: message.into(),
        }
    }

    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn hook(hook: impl Into<String>, cause: Error) -> Self {
        Self::Hook {
            hook: hook.into(),
            cause: Box::new(cause),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Body { .. } => ErrorKind::Body,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::DoubleDone => ErrorKind::DoubleDone,
            Error::Hook { .. } => ErrorKind::Hook,
        }
    }

    /// The innermost error, looking through hook attribution.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Hook { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// The display message, mirroring what renderers print.
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Error::Body { message } => Cow::Borrowed(message),
            other => Cow::Owned(other.to_string()),
        }
    }
}
