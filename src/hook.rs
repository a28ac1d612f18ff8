//! Setup and teardown around suites and tests.

use std::borrow::Cow;

use crate::{
    api::{HookApi, TestableApi},
    body::{Body, BodyResult, Done},
    error::Error,
    options::{Options, Settings},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookRole {
    Before,
    After,
}

/// A named setup or teardown action.
///
/// Hooks are plain data, every run is independent of the previous ones.
#[derive(Debug, Clone)]
pub struct Hook {
    name: Cow<'static, str>,
    body: Body<HookApi>,
    settings: Settings,
}

impl Hook {
    pub fn new<F, T>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&HookApi) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        Self::from_body(name, Body::new(f))
    }

    /// A hook that settles once it returned and invoked [`Done`].
    pub fn with_done<F, T>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&HookApi, Done) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        Self::from_body(name, Body::with_done(f))
    }

    pub fn from_body(name: impl Into<Cow<'static, str>>, body: Body<HookApi>) -> Self {
        Self {
            name: name.into(),
            body,
            settings: Settings::default(),
        }
    }

    pub fn with_settings(self, settings: Settings) -> Self {
        Self { settings, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the hook for `owner`.
    ///
    /// The hook's own settings are layered on top of the owner's options, so
    /// a hook may declare a longer or shorter timeout than its owner.
    pub fn run(&self, owner: &TestableApi, options: &Options) -> Result<(), Error> {
        let api = HookApi {
            name: self.name.clone(),
            description: format!("{} / {}", owner.description(), self.name),
            owner: owner.clone(),
        };
        let options = options.apply(&Options::new(self.settings.clone()));
        tracing::trace!(hook = %api.description, timeout = ?options.timeout(), "running hook");
        self.body.run(api, options.timeout())
    }
}

/// Ordered before and after hooks of one owner.
#[derive(Debug, Clone, Default)]
pub struct HookSet {
    befores: Vec<Hook>,
    afters: Vec<Hook>,
    started: bool,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: HookRole, hook: Hook) {
        match role {
            HookRole::Before => self.befores.push(hook),
            HookRole::After => self.afters.push(hook),
        }
    }

    pub fn befores(&self) -> &[Hook] {
        &self.befores
    }

    pub fn afters(&self) -> &[Hook] {
        &self.afters
    }

    pub fn is_empty(&self) -> bool {
        self.befores.is_empty() && self.afters.is_empty()
    }

    /// Whether any before hook was attempted, gates the afters.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// A fresh copy with the same hooks, as handed to a finalized testable.
    pub(crate) fn unstarted(&self) -> Self {
        Self {
            befores: self.befores.clone(),
            afters: self.afters.clone(),
            started: false,
        }
    }

    /// Run the befores in registration order.
    ///
    /// Stops at the first failing hook, which is returned attributed to the
    /// hook, or at the first hook that skipped the owner.
    pub fn run_befores(&mut self, owner: &TestableApi, options: &Options) -> Result<(), Error> {
        self.started = true;
        for hook in &self.befores {
            hook.run(owner, options)
                .map_err(|err| Error::hook(hook.name(), err))?;
            if owner.is_skipped() {
                tracing::debug!(
                    hook = hook.name(),
                    owner = owner.description(),
                    "skipped by before hook"
                );
                break;
            }
        }
        Ok(())
    }

    /// Run the afters in registration order, if the befores were started.
    ///
    /// The owner can no longer be skipped from here.
    pub fn run_afters(&self, owner: &TestableApi, options: &Options) -> Result<(), Error> {
        if !self.started {
            return Ok(());
        }
        let owner = owner.without_skip();
        for hook in &self.afters {
            hook.run(&owner, options)
                .map_err(|err| Error::hook(hook.name(), err))?;
        }
        Ok(())
    }
}
