use std::borrow::Cow;

use crate::{
    api::{SkipSwitch, TestableApi},
    hook::{Hook, HookRole, HookSet},
    options::{Options, Settings},
    reporter::Reporter,
    test::{PENDING, Test},
    testable::{Event, Fixture, Kind, Outcome, Stats, Testable},
};

/// A child of a suite.
#[derive(Debug, Clone)]
pub enum Node {
    Suite(Suite),
    Test(Test),
}

impl From<Suite> for Node {
    fn from(suite: Suite) -> Self {
        Self::Suite(suite)
    }
}

impl From<Test> for Node {
    fn from(test: Test) -> Self {
        Self::Test(test)
    }
}

impl Node {
    pub fn as_suite(&self) -> Option<&Suite> {
        match self {
            Self::Suite(suite) => Some(suite),
            Self::Test(_) => None,
        }
    }

    pub fn as_test(&self) -> Option<&Test> {
        match self {
            Self::Test(test) => Some(test),
            Self::Suite(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Self::Suite(suite) => suite.children(),
            Self::Test(_) => &[],
        }
    }

    /// Walk down by child indices, an empty path is the node itself.
    pub fn resolve(&self, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, &index| node.children().get(index))
    }

    /// Run the node, `force` only matters for suites.
    pub fn run(
        &mut self,
        reporter: &mut dyn Reporter,
        runtime: &Settings,
        inherited: &Options,
        force: bool,
    ) {
        match self {
            Self::Suite(suite) => suite.run(reporter, runtime, inherited, force),
            Self::Test(test) => test.run(reporter, runtime, inherited),
        }
    }

    pub(crate) fn finalized(
        &self,
        parent: Option<&str>,
        hooks: &[HookSet],
        points: &mut usize,
    ) -> Node {
        let description: Cow<'static, str> = match parent {
            Some(parent) => format!("{parent} / {}", self.name()).into(),
            None => self.fixture().name.clone(),
        };
        match self {
            Self::Suite(suite) => suite.finalized(description, hooks, points).into(),
            Self::Test(test) => {
                *points += 1;
                test.finalized(description, *points, hooks).into()
            }
        }
    }

    fn should_run(&self, force: bool) -> bool {
        force || self.is_exclusive() || self.has_exclusive_descendant()
    }
}

impl Testable for Node {
    fn kind(&self) -> Kind {
        match self {
            Self::Suite(suite) => suite.kind(),
            Self::Test(test) => test.kind(),
        }
    }

    fn fixture(&self) -> &Fixture {
        match self {
            Self::Suite(suite) => suite.fixture(),
            Self::Test(test) => test.fixture(),
        }
    }

    fn stats(&self) -> Stats {
        match self {
            Self::Suite(suite) => suite.stats(),
            Self::Test(test) => test.stats(),
        }
    }

    fn number_of_tests(&self) -> usize {
        match self {
            Self::Suite(suite) => suite.number_of_tests(),
            Self::Test(test) => test.number_of_tests(),
        }
    }

    fn has_exclusive_descendant(&self) -> bool {
        match self {
            Self::Suite(suite) => suite.has_exclusive_descendant(),
            Self::Test(test) => test.has_exclusive_descendant(),
        }
    }

    fn point(&self) -> Option<usize> {
        match self {
            Self::Suite(suite) => suite.point(),
            Self::Test(test) => test.point(),
        }
    }
}

/// A group of suites and tests sharing options and hooks.
///
/// `before`/`after` hooks run once around the whole suite.
/// `before_each`/`after_each` hooks are templates: finalizing hands a copy to
/// every test below, so they run once around each test.
#[derive(Debug, Clone)]
pub struct Suite {
    fixture: Fixture,
    children: Vec<Node>,
    hooks: HookSet,
    test_hooks: HookSet,
}

impl Suite {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            fixture: Fixture::new(name),
            children: Vec::new(),
            hooks: HookSet::new(),
            test_hooks: HookSet::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.fixture.settings = settings;
        self
    }

    pub fn add(mut self, child: impl Into<Node>) -> Self {
        self.push(child);
        self
    }

    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn before(mut self, hook: Hook) -> Self {
        self.hooks.push(HookRole::Before, hook);
        self
    }

    pub fn after(mut self, hook: Hook) -> Self {
        self.hooks.push(HookRole::After, hook);
        self
    }

    pub fn before_each(mut self, hook: Hook) -> Self {
        self.test_hooks.push(HookRole::Before, hook);
        self
    }

    pub fn after_each(mut self, hook: Hook) -> Self {
        self.test_hooks.push(HookRole::After, hook);
        self
    }

    pub(crate) fn push_hook(&mut self, role: HookRole, hook: Hook) {
        self.hooks.push(role, hook);
    }

    pub(crate) fn push_test_hook(&mut self, role: HookRole, hook: Hook) {
        self.test_hooks.push(role, hook);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    /// The `before_each`/`after_each` templates.
    pub fn test_hooks(&self) -> &HookSet {
        &self.test_hooks
    }

    /// A suite without children has nothing to run.
    pub fn is_pending(&self) -> bool {
        self.children.is_empty()
    }

    fn api(&self, switch: Option<SkipSwitch>) -> TestableApi {
        TestableApi {
            kind: Kind::Suite,
            name: self.fixture.name.clone(),
            description: self.fixture.description.clone(),
            point: None,
            switch,
        }
    }

    fn finalized(&self, description: Cow<'static, str>, hooks: &[HookSet], points: &mut usize) -> Suite {
        let mut inherited = hooks.to_vec();
        if !self.test_hooks.is_empty() {
            inherited.push(self.test_hooks.unstarted());
        }
        let children = self
            .children
            .iter()
            .map(|child| child.finalized(Some(description.as_ref()), &inherited, points))
            .collect();
        Suite {
            fixture: self.fixture.finalized(description),
            children,
            hooks: self.hooks.unstarted(),
            test_hooks: self.test_hooks.unstarted(),
        }
    }

    /// Run the suite and everything below it.
    ///
    /// Unless `force` is set, only children that are exclusive or contain
    /// something exclusive run, the others are skipped.
    pub fn run(
        &mut self,
        reporter: &mut dyn Reporter,
        runtime: &Settings,
        inherited: &Options,
        force: bool,
    ) {
        if !self.fixture.result.is_pending() {
            tracing::warn!(suite = %self.fixture.description, "suite already ran");
            return;
        }

        let options = inherited
            .apply(&Options::new(self.fixture.settings.clone()).with_runtime(runtime.clone()));

        let mut child_reporter = reporter.with_suite(self);
        self.fixture.start();
        reporter.on_event(self, Event::Started);
        tracing::debug!(
            suite = %self.fixture.description,
            force,
            options = ?options.export(),
            "suite started"
        );

        let force = force || (self.is_exclusive() && !self.has_exclusive_descendant());
        let runnable = self.children.iter().any(|child| child.should_run(force));

        let switch = SkipSwitch::new();
        let api = self.api(Some(switch.clone()));
        let mut errors = Vec::new();
        let mut child_options = options.inheritable();

        if options.skip() {
            child_options.bequeath(Settings::skipped(options.reason()));
        } else if runnable {
            match self.hooks.run_befores(&api, &options) {
                Err(err) => {
                    tracing::debug!(suite = %self.fixture.description, %err, "before hook failed");
                    errors.push(err);
                    child_options.bequeath(Settings::skipped(None));
                }
                Ok(()) => {
                    if let Some(reason) = switch.reason() {
                        child_options.bequeath(Settings::skipped(reason));
                    }
                }
            }
        }
        let skipped = switch.reason();

        let abort = options.abort();
        for child in &mut self.children {
            let mut inherited = child_options.clone();
            if !child.should_run(force) {
                inherited.bequeath(Settings::skipped(None));
            }
            child.run(child_reporter.as_mut(), runtime, &inherited, force);
            if abort && child.result().is_failed() {
                tracing::debug!(
                    suite = %self.fixture.description,
                    child = child.name(),
                    "aborting remaining children"
                );
                child_options.bequeath(Settings::skipped(None));
            }
        }

        if let Err(err) = self.hooks.run_afters(&api, &options) {
            errors.push(err);
        }

        let (outcome, reason) = if options.skip() {
            (Outcome::Skipped, options.reason())
        } else if let Some(reason) = skipped {
            (Outcome::Skipped, reason.or_else(|| options.reason()))
        } else if self.is_pending() {
            (Outcome::Skipped, Some(Cow::Borrowed(PENDING)))
        } else if !errors.is_empty() || self.children.iter().any(|c| c.result().is_failed()) {
            (Outcome::Failed, None)
        } else {
            (Outcome::Passed, None)
        };

        if let Some(event) = self.fixture.resolve(outcome, reason, errors) {
            reporter.on_event(self, event);
        }
        tracing::debug!(
            suite = %self.fixture.description,
            result = ?self.fixture.result,
            stats = ?self.stats(),
            "suite finished"
        );
        reporter.on_event(self, Event::Finished);
    }
}

impl Testable for Suite {
    fn kind(&self) -> Kind {
        Kind::Suite
    }

    fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    fn stats(&self) -> Stats {
        self.children.iter().map(Testable::stats).sum()
    }

    fn number_of_tests(&self) -> usize {
        self.children.iter().map(Testable::number_of_tests).sum()
    }

    fn has_exclusive_descendant(&self) -> bool {
        self.children.iter().any(|child| {
            !child.fixture().is_skip_declared()
                && (child.is_exclusive() || child.has_exclusive_descendant())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{api::HookApi, error::ErrorKind, test_support::*};

    fn counting(counter: &Arc<AtomicUsize>, name: &'static str) -> Test {
        let counter = Arc::clone(counter);
        Test::new(name, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn passing_children_pass_suite() {
        let suite = run_suite(
            Suite::new("Suite")
                .add(passing_test("one"))
                .add(passing_test("two"))
                .add(passing_test("three")),
        );
        assert_eq!(suite.result(), Outcome::Passed);
        assert_eq!(suite.stats().passed, 3);
        assert_eq!(suite.stats().tests_total, 3);
    }

    #[test]
    fn failing_child_fails_suite() {
        let suite = run_suite(
            Suite::new("Suite")
                .add(passing_test("one"))
                .add(failing_test("two")),
        );
        let stats = suite.stats();
        assert_eq!(suite.result(), Outcome::Failed);
        assert_eq!((stats.tests_total, stats.passed, stats.failed), (2, 1, 1));
        assert!(suite.errors().is_empty());
    }

    #[test]
    fn stats_are_sum_of_nested_children() {
        let suite = run_suite(
            Suite::new("Outer")
                .add(passing_test("one"))
                .add(
                    Suite::new("Inner")
                        .add(failing_test("two"))
                        .add(skipped_test("three")),
                ),
        );
        let stats = suite.stats();
        assert_eq!(
            (stats.tests_total, stats.passed, stats.failed, stats.skipped),
            (3, 1, 1, 1)
        );
        assert_eq!(suite.result(), Outcome::Failed);
    }

    #[test]
    fn stats_duration_sums_children_without_hook_time() {
        let suite = run_suite(
            Suite::new("Suite")
                .before(Hook::new("slow setup", |_: &HookApi| {
                    std::thread::sleep(std::time::Duration::from_millis(80))
                }))
                .add(passing_test("one"))
                .add(passing_test("two")),
        );
        let summed: Stats = suite.children().iter().map(Testable::stats).sum();

        assert_eq!(suite.stats(), summed);
        assert!(suite.duration().unwrap_or_default() >= std::time::Duration::from_millis(80));
        assert!(suite.stats().duration_ms < 80);
    }

    #[test]
    fn skipped_suite_skips_every_descendant() {
        let counter = Arc::new(AtomicUsize::new(0));
        let hooks_ran = Arc::new(AtomicUsize::new(0));
        let hook_counter = Arc::clone(&hooks_ran);
        let suite = Suite::new("Suite")
            .with_settings(Settings::skipped(Some("broken".into())))
            .before(Hook::new("before", move |_: &HookApi| {
                hook_counter.fetch_add(1, Ordering::SeqCst);
            }))
            .add(counting(&counter, "one"))
            .add(Suite::new("Inner").add(counting(&counter, "two")));
        let suite = run_suite(suite);

        assert_eq!(suite.result(), Outcome::Skipped);
        assert_eq!(suite.reason(), Some("broken"));
        assert_eq!(suite.stats().skipped, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(hooks_ran.load(Ordering::SeqCst), 0);
        let inner_test = &suite.children()[1].children()[0];
        assert_eq!(inner_test.result(), Outcome::Skipped);
        assert_eq!(inner_test.reason(), Some("broken"));
    }

    #[test]
    fn skip_of_suite_beats_explicit_child_setting() {
        let suite = run_suite(
            Suite::new("Suite")
                .with_settings(Settings::new().with_skip(true))
                .add(passing_test("one").with_settings(Settings::new().with_skip(false))),
        );
        assert_eq!(suite.children()[0].result(), Outcome::Skipped);
    }

    #[test]
    fn failing_before_hook_fails_suite_and_skips_children() {
        let counter = Arc::new(AtomicUsize::new(0));
        let suite = Suite::new("Suite")
            .before(Hook::new("before", |_: &HookApi| Err::<(), _>("Oh Noes!")))
            .add(counting(&counter, "one"))
            .add(counting(&counter, "two"))
            .add(counting(&counter, "three"));
        let suite = run_suite(suite);

        assert_eq!(suite.result(), Outcome::Failed);
        assert_eq!(suite.errors().len(), 1);
        assert_eq!(suite.errors()[0].kind(), ErrorKind::Hook);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let stats = suite.stats();
        assert_eq!((stats.passed, stats.failed, stats.skipped), (0, 0, 3));
        assert!(stats.incomplete());
    }

    #[test]
    fn after_hooks_run_once_befores_started() {
        let afters = Arc::new(AtomicUsize::new(0));
        let after_counter = Arc::clone(&afters);
        let suite = Suite::new("Suite")
            .before(Hook::new("before", |_: &HookApi| Err::<(), _>("Oh Noes!")))
            .after(Hook::new("after", move |_: &HookApi| {
                after_counter.fetch_add(1, Ordering::SeqCst);
            }))
            .add(passing_test("one"));
        run_suite(suite);
        assert_eq!(afters.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_after_hook_fails_passing_suite() {
        let suite = run_suite(
            Suite::new("Suite")
                .after(Hook::new("after", |_: &HookApi| Err::<(), _>("teardown")))
                .add(passing_test("one")),
        );
        assert_eq!(suite.result(), Outcome::Failed);
        assert_eq!(suite.stats().passed, 1);
        assert_eq!(suite.errors()[0].root_cause().message(), "teardown");
    }

    #[test]
    fn before_hook_can_skip_suite() {
        let counter = Arc::new(AtomicUsize::new(0));
        let suite = Suite::new("Suite")
            .before(Hook::new("before", |api: &HookApi| {
                if let Some(suite) = api.suite() {
                    suite.skip_because("no network");
                }
            }))
            .add(counting(&counter, "one"));
        let suite = run_suite(suite);

        assert_eq!(suite.result(), Outcome::Skipped);
        assert_eq!(suite.reason(), Some("no network"));
        assert_eq!(suite.children()[0].reason(), Some("no network"));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn abort_skips_remaining_children() {
        let counter = Arc::new(AtomicUsize::new(0));
        let suite = Suite::new("Suite")
            .with_settings(Settings::new().with_abort(true))
            .add(counting(&counter, "one"))
            .add(failing_test("two"))
            .add(counting(&counter, "three"))
            .add(counting(&counter, "four"));
        let suite = run_suite(suite);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        let results: Vec<_> = suite.children().iter().map(Testable::result).collect();
        assert_eq!(
            results,
            vec![
                Outcome::Passed,
                Outcome::Failed,
                Outcome::Skipped,
                Outcome::Skipped
            ]
        );
    }

    #[test]
    fn without_abort_all_children_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let suite = Suite::new("Suite")
            .add(failing_test("one"))
            .add(counting(&counter, "two"));
        run_suite(suite);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn only_exclusive_children_run_unforced() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut suite: Node = Suite::new("Suite")
            .add(counting(&counter, "exclusive").with_settings(Settings::new().with_exclusive(true)))
            .add(counting(&counter, "normal"))
            .into();
        suite.run(
            &mut crate::reporter::NullReporter,
            &Settings::default(),
            &Options::default(),
            false,
        );

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(suite.children()[0].result(), Outcome::Passed);
        assert_eq!(suite.children()[1].result(), Outcome::Skipped);
        assert_eq!(suite.stats().skipped, 1);
        assert_eq!(suite.stats().passed, 1);
    }

    #[test]
    fn skipped_exclusive_is_ignored() {
        let suite = Suite::new("Suite")
            .add(exclusive_test("one").with_settings(Settings::new().with_exclusive(true).with_skip(true)))
            .add(Suite::new("Inner").with_settings(Settings::new().with_skip(true)).add(exclusive_test("two")));
        assert!(!suite.has_exclusive_descendant());
    }

    #[test]
    fn empty_suite_is_pending() {
        let suite = run_suite(Suite::new("Suite"));
        assert!(suite.as_suite().unwrap().is_pending());
        assert_eq!(suite.result(), Outcome::Skipped);
        assert_eq!(suite.reason(), Some("Pending"));
    }

    #[test]
    fn resolve_walks_child_indices() {
        let node: Node = Suite::new("A")
            .add(passing_test("B"))
            .add(Suite::new("C").add(passing_test("D")))
            .into();
        assert_eq!(node.resolve(&[]).map(Testable::name), Some("A"));
        assert_eq!(node.resolve(&[1, 0]).map(Testable::name), Some("D"));
        assert!(node.resolve(&[0, 0]).is_none());
    }
}
