//! `describe`/`it` style authoring.
//!
//! Every block receives the [`SuiteBuilder`] of the suite it describes, there
//! is no ambient registration state.
//!
//! ```
//! use suitest::{Harness, syntax::describe};
//!
//! let suite = describe("Math", |s| {
//!     s.it("adds", |_| assert_eq!(1 + 1, 2));
//!     s.describe("division", |s| {
//!         s.xit("by zero", |_| ());
//!     });
//! });
//!
//! let report = Harness::new(suite).run_quiet();
//! assert!(report.passed());
//! assert_eq!(report.stats().skipped, 1);
//! ```

use std::borrow::Cow;

use crate::{
    api::{HookApi, TestableApi},
    body::{BodyResult, Done},
    hook::{Hook, HookRole},
    options::Settings,
    suite::{Node, Suite},
    test::Test,
};

/// Where a hook is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookSlot {
    Before,
    BeforeEach,
    After,
    AfterEach,
}

impl HookSlot {
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::BeforeEach => "beforeEach",
            Self::After => "after",
            Self::AfterEach => "afterEach",
        }
    }
}

pub fn describe(name: impl Into<Cow<'static, str>>, build: impl FnOnce(&mut SuiteBuilder)) -> Suite {
    SuiteBuilder::build(name, Settings::new(), build)
}

/// A skipped [`describe`].
pub fn xdescribe(name: impl Into<Cow<'static, str>>, build: impl FnOnce(&mut SuiteBuilder)) -> Suite {
    SuiteBuilder::build(name, Settings::new().with_skip(true), build)
}

/// An exclusive [`describe`].
pub fn odescribe(name: impl Into<Cow<'static, str>>, build: impl FnOnce(&mut SuiteBuilder)) -> Suite {
    SuiteBuilder::build(name, Settings::new().with_exclusive(true), build)
}

#[derive(Debug)]
pub struct SuiteBuilder {
    suite: Suite,
    settings: Settings,
}

impl SuiteBuilder {
    fn build(
        name: impl Into<Cow<'static, str>>,
        settings: Settings,
        build: impl FnOnce(&mut SuiteBuilder),
    ) -> Suite {
        let mut builder = SuiteBuilder {
            suite: Suite::new(name),
            settings,
        };
        build(&mut builder);
        let SuiteBuilder { suite, settings } = builder;
        suite.with_settings(settings)
    }

    /// Layer `settings` over what this suite declared so far.
    pub fn settings(&mut self, settings: Settings) -> &mut Self {
        self.settings = self.settings.merged(&settings);
        self
    }

    pub fn describe(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        build: impl FnOnce(&mut SuiteBuilder),
    ) -> &mut Self {
        self.include(describe(name, build))
    }

    pub fn xdescribe(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        build: impl FnOnce(&mut SuiteBuilder),
    ) -> &mut Self {
        self.include(xdescribe(name, build))
    }

    pub fn odescribe(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        build: impl FnOnce(&mut SuiteBuilder),
    ) -> &mut Self {
        self.include(odescribe(name, build))
    }

    pub fn it<F, T>(&mut self, name: impl Into<Cow<'static, str>>, f: F) -> &mut Self
    where
        F: Fn(&TestableApi) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        self.include(Test::new(name, f))
    }

    /// A skipped [`it`](Self::it).
    pub fn xit<F, T>(&mut self, name: impl Into<Cow<'static, str>>, f: F) -> &mut Self
    where
        F: Fn(&TestableApi) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        self.include(Test::new(name, f).with_settings(Settings::new().with_skip(true)))
    }

    /// An exclusive [`it`](Self::it).
    pub fn oit<F, T>(&mut self, name: impl Into<Cow<'static, str>>, f: F) -> &mut Self
    where
        F: Fn(&TestableApi) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        self.include(Test::new(name, f).with_settings(Settings::new().with_exclusive(true)))
    }

    /// An [`it`](Self::it) settling through [`Done`].
    pub fn it_with_done<F, T>(&mut self, name: impl Into<Cow<'static, str>>, f: F) -> &mut Self
    where
        F: Fn(&TestableApi, Done) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        self.include(Test::with_done(name, f))
    }

    pub fn pending(&mut self, name: impl Into<Cow<'static, str>>) -> &mut Self {
        self.include(Test::pending(name))
    }

    pub fn before<F, T>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&HookApi) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        self.hook(HookSlot::Before, Hook::new(HookSlot::Before.default_name(), f))
    }

    pub fn before_each<F, T>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&HookApi) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        self.hook(
            HookSlot::BeforeEach,
            Hook::new(HookSlot::BeforeEach.default_name(), f),
        )
    }

    pub fn after<F, T>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&HookApi) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        self.hook(HookSlot::After, Hook::new(HookSlot::After.default_name(), f))
    }

    pub fn after_each<F, T>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&HookApi) -> T + Send + Sync + 'static,
        T: Into<BodyResult>,
    {
        self.hook(
            HookSlot::AfterEach,
            Hook::new(HookSlot::AfterEach.default_name(), f),
        )
    }

    /// Register a prebuilt hook, for custom names, settings or [`Done`] bodies.
    pub fn hook(&mut self, slot: HookSlot, hook: Hook) -> &mut Self {
        match slot {
            HookSlot::Before => self.suite.push_hook(HookRole::Before, hook),
            HookSlot::After => self.suite.push_hook(HookRole::After, hook),
            HookSlot::BeforeEach => self.suite.push_test_hook(HookRole::Before, hook),
            HookSlot::AfterEach => self.suite.push_test_hook(HookRole::After, hook),
        }
        self
    }

    /// Add a prebuilt suite or test.
    pub fn include(&mut self, node: impl Into<Node>) -> &mut Self {
        self.suite.push(node);
        self
    }
}
