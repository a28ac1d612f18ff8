//! The objects handed to test and hook bodies.

use std::{
    borrow::Cow,
    sync::{Arc, OnceLock},
};

use crate::testable::Kind;

/// A one shot flag for skipping a testable from inside a running body.
///
/// Bodies run on worker threads, so the switch is shared. The first skip wins,
/// later calls keep the original reason.
#[derive(Debug, Clone, Default)]
pub struct SkipSwitch(Arc<OnceLock<Option<Cow<'static, str>>>>);

impl SkipSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(&self, reason: Option<Cow<'static, str>>) {
        let _ = self.0.set(reason);
    }

    pub fn is_skipped(&self) -> bool {
        self.0.get().is_some()
    }

    /// `None` if no skip happened, `Some(reason)` otherwise.
    pub fn reason(&self) -> Option<Option<Cow<'static, str>>> {
        self.0.get().cloned()
    }
}

/// The API of a suite or test as seen from a body.
///
/// Test bodies always get a skippable API. Hooks see the API of their owner,
/// which is only skippable from a before hook.
#[derive(Debug, Clone)]
pub struct TestableApi {
    pub(crate) kind: Kind,
    pub(crate) name: Cow<'static, str>,
    pub(crate) description: Cow<'static, str>,
    pub(crate) point: Option<usize>,
    pub(crate) switch: Option<SkipSwitch>,
}

impl TestableApi {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The test point, `None` for suites.
    pub fn point(&self) -> Option<usize> {
        self.point
    }

    pub fn can_skip(&self) -> bool {
        self.switch.is_some()
    }

    /// Whether a body or before hook skipped this testable.
    pub fn is_skipped(&self) -> bool {
        self.switch.as_ref().is_some_and(SkipSwitch::is_skipped)
    }

    pub fn skip(&self) {
        self.skip_with(None);
    }

    pub fn skip_because(&self, reason: impl Into<Cow<'static, str>>) {
        self.skip_with(Some(reason.into()));
    }

    fn skip_with(&self, reason: Option<Cow<'static, str>>) {
        match &self.switch {
            Some(switch) => switch.skip(reason),
            None => tracing::warn!(
                description = %self.description,
                "skip requested outside of a before hook, ignoring"
            ),
        }
    }

    pub(crate) fn without_skip(&self) -> Self {
        Self {
            switch: None,
            ..self.clone()
        }
    }
}

/// The API handed to a hook body.
#[derive(Debug, Clone)]
pub struct HookApi {
    pub(crate) name: Cow<'static, str>,
    pub(crate) description: String,
    pub(crate) owner: TestableApi,
}

impl HookApi {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owner's description followed by the hook name.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn owner(&self) -> &TestableApi {
        &self.owner
    }

    /// The owning suite, if this hook belongs to one.
    pub fn suite(&self) -> Option<&TestableApi> {
        (self.owner.kind == Kind::Suite).then_some(&self.owner)
    }

    /// The owning test, if this hook belongs to one.
    pub fn test(&self) -> Option<&TestableApi> {
        (self.owner.kind == Kind::Test).then_some(&self.owner)
    }
}
