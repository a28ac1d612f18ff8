//! Layered configuration for suites, tests and hooks.
//!
//! A value is looked up through four scopes. Later scopes win:
//!
//! 1. `defaults`: built in, see [`Settings::defaults`]
//! 2. `initial`: declared by the author when constructing a testable
//! 3. `runtime`: handed into a specific run
//! 4. `bequeathed`: pushed down by an ancestor while the run is in progress,
//!    for example a skip triggered by a failing sibling under `abort`
//!
//! `exclusive` is a declaration about a single node. It is dropped whenever
//! options are handed down to children, see [`Options::inheritable`].

use std::{borrow::Cow, time::Duration};

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// A single scope of options. Every key is optional, unset keys fall through
/// to the scope below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    #[serde(with = "millis", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort: Option<bool>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built in scope: a timeout of 5000ms and no skipping.
    pub fn defaults() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            skip: Some(false),
            ..Self::default()
        }
    }

    /// Shorthand for a scope that only skips, optionally with a reason.
    pub fn skipped(reason: Option<Cow<'static, str>>) -> Self {
        Self {
            skip: Some(true),
            reason,
            ..Self::default()
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    pub fn with_timeout_ms(self, timeout: u64) -> Self {
        self.with_timeout(Duration::from_millis(timeout))
    }

    pub fn with_skip(self, skip: bool) -> Self {
        Self {
            skip: Some(skip),
            ..self
        }
    }

    pub fn with_exclusive(self, exclusive: bool) -> Self {
        Self {
            exclusive: Some(exclusive),
            ..self
        }
    }

    pub fn with_reason(self, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..self
        }
    }

    pub fn with_abort(self, abort: bool) -> Self {
        Self {
            abort: Some(abort),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merge `other` on top of `self`, keys set in `other` win.
    pub fn merged(&self, other: &Settings) -> Settings {
        Settings {
            timeout: other.timeout.or(self.timeout),
            skip: other.skip.or(self.skip),
            exclusive: other.exclusive.or(self.exclusive),
            reason: other.reason.clone().or_else(|| self.reason.clone()),
            abort: other.abort.or(self.abort),
        }
    }

    fn without_exclusive(&self) -> Settings {
        Settings {
            exclusive: None,
            ..self.clone()
        }
    }
}

/// The four scopes together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub defaults: Settings,
    pub initial: Settings,
    pub runtime: Settings,
    pub bequeathed: Settings,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            defaults: Settings::defaults(),
            initial: Settings::default(),
            runtime: Settings::default(),
            bequeathed: Settings::default(),
        }
    }
}

impl Options {
    pub fn new(initial: Settings) -> Self {
        Self {
            initial,
            ..Self::default()
        }
    }

    pub fn with_runtime(self, runtime: Settings) -> Self {
        Self { runtime, ..self }
    }

    fn scopes(&self) -> [&Settings; 4] {
        [&self.defaults, &self.initial, &self.runtime, &self.bequeathed]
    }

    fn resolve<T>(&self, key: impl Fn(&Settings) -> Option<T>) -> Option<T> {
        self.scopes().into_iter().rev().find_map(key)
    }

    pub fn timeout(&self) -> Duration {
        self.resolve(|s| s.timeout).unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn skip(&self) -> bool {
        self.resolve(|s| s.skip).unwrap_or(false)
    }

    pub fn exclusive(&self) -> bool {
        self.resolve(|s| s.exclusive).unwrap_or(false)
    }

    pub fn reason(&self) -> Option<Cow<'static, str>> {
        self.resolve(|s| s.reason.clone())
    }

    pub fn abort(&self) -> bool {
        self.resolve(|s| s.abort).unwrap_or(false)
    }

    /// Layer `other` on top of `self`, scope by scope.
    ///
    /// Each scope keeps its place in the precedence order, within a scope the
    /// keys of `other` win. The result shares nothing with either input.
    pub fn apply(&self, other: &Options) -> Options {
        Options {
            defaults: self.defaults.merged(&other.defaults),
            initial: self.initial.merged(&other.initial),
            runtime: self.runtime.merged(&other.runtime),
            bequeathed: self.bequeathed.merged(&other.bequeathed),
        }
    }

    /// Push `partial` into the bequeathed scope of this instance.
    pub fn bequeath(&mut self, partial: Settings) {
        self.bequeathed = self.bequeathed.merged(&partial);
    }

    /// A copy suitable for handing down to children, without `exclusive`.
    pub fn inheritable(&self) -> Options {
        Options {
            defaults: self.defaults.without_exclusive(),
            initial: self.initial.without_exclusive(),
            runtime: self.runtime.without_exclusive(),
            bequeathed: self.bequeathed.without_exclusive(),
        }
    }

    /// All scopes flattened into one.
    pub fn export(&self) -> Settings {
        self.scopes()
            .into_iter()
            .fold(Settings::default(), |acc, scope| acc.merged(scope))
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => {
                serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
